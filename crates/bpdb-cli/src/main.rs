use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod io;
mod output;
mod report;
mod telemetry;

fn main() -> Result<()> {
    let cli = args::Cli::parse();
    output::init(cli.json);
    telemetry::init(cli.verbose, cli.log_json);

    cmd::dispatch(cli)
}
