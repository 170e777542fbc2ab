use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::report::RunReport;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

/// Print a run report, as JSON or as a short human summary.
pub fn print_report(report: &RunReport) -> anyhow::Result<()> {
    if is_json() {
        return print_json(report);
    }

    let mut out = stdout();
    let clean = report.total_anomalies == 0;

    out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(if clean {
        Color::Green
    } else {
        Color::Yellow
    })))?;
    write!(out, "{}", report.command)?;
    out.reset()?;
    writeln!(out, " {}", report.input)?;
    if let Some(path) = &report.output {
        writeln!(out, "  wrote      {path}")?;
    }
    writeln!(out, "  blueprints {}", report.blueprints)?;
    writeln!(out, "  users      {}", report.users)?;
    writeln!(out, "  tags       {}", report.tags)?;
    writeln!(out, "  sha256     {}", report.output_sha256)?;

    if clean {
        writeln!(out, "  no anomalies")?;
        return Ok(());
    }

    writeln!(out, "  anomalies  {}", report.total_anomalies)?;
    for (name, n) in report.anomalies.iter().filter(|(_, n)| **n > 0) {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(out, "    {n:>6}")?;
        out.reset()?;
        writeln!(out, " {name}")?;
    }
    Ok(())
}
