mod app;
mod cli;
mod control;

use anyhow::Result;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    batch_logging::initialize(args.log.into(), args.level);
    app::run(args).await?;
    // An unanswered prompt may still hold a blocking stdin read, which
    // dropping the runtime would wait on.
    std::process::exit(0);
}
