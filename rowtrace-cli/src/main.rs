use anyhow::Result;
use clap::Parser;

use rowtrace_cli::{Cli, Command, init_tracing, record, replay};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match &cli.command {
        Command::Record(args) => record::run(&cli.device, args).await,
        Command::Replay(args) => replay::run(args).await,
    }
}
