use anyhow::Result;
use clap::Parser;
use sage_inspector::{Cli, Commands};
use tracing_log::AsTrace;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let subscriber = FmtSubscriber::builder()
    .with_max_level(cli.verbose.log_level_filter().as_trace())
    .without_time()
    .finish();
  tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

  match &cli.command {
    Commands::Logs(logs) => logs.run().await,
    Commands::Open(open) => open.run().await,
    Commands::Scaffold(scaffold) => scaffold.run().await,
  }
}
