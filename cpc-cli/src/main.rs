//! CPC CLI - Command line tool for region data and weighted aggregation.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "cpc-cli",
    version,
    about = "Climate region data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: cpc_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    cpc_cmd::run(cli.command)
}
