use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Parser, Debug, Clone)]
#[command(name = "bpdb", version, about = "Blueprint database reconciler")]
pub struct Cli {
    /// Emit the run report as JSON on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Raise log verbosity (-v debug, -vv trace). BPDB_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Write log events to stderr as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Largest input document accepted, in bytes.
    #[arg(long, global = true)]
    pub max_input_bytes: Option<usize>,

    /// Instant used when a summary has no lastUpdatedDate (RFC 3339).
    #[arg(long, global = true, value_parser = parse_rfc3339)]
    pub fallback_date: Option<OffsetDateTime>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reconcile a snapshot and write the corrected document.
    Cleanse {
        /// Snapshot to read.
        input: PathBuf,

        /// Where to write the corrected snapshot.
        #[arg(long)]
        out: PathBuf,
    },

    /// Reconcile a snapshot and report, without writing anything.
    Check {
        /// Snapshot to read.
        input: PathBuf,
    },
}

fn parse_rfc3339(s: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|e| format!("expected an RFC 3339 instant: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bpdb",
            "cleanse",
            "in.json",
            "--out",
            "out.json",
            "-vv",
            "--fallback-date",
            "2018-06-01T00:00:00Z",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.fallback_date.map(|d| d.year()), Some(2018));
        assert!(matches!(cli.command, Command::Cleanse { .. }));
    }

    #[test]
    fn cleanse_requires_out() {
        assert!(Cli::try_parse_from(["bpdb", "cleanse", "in.json"]).is_err());
    }

    #[test]
    fn rejects_bad_fallback_date() {
        assert!(Cli::try_parse_from(["bpdb", "check", "in.json", "--fallback-date", "yesterday"]).is_err());
    }
}
