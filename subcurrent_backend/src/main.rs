use anyhow::Result;
use clap::{Parser, Subcommand};
use subcurrent_backend::config::SubcurrentConfig;
use subcurrent_backend::node::SubcurrentNode;
use subcurrent_backend::telemetry;

#[derive(Parser)]
#[command(author, version, about = "Subcurrent community-discussion backend")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for REST/API access
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let config = SubcurrentConfig::from_env()?;
    let node = SubcurrentNode::start(config).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => node.run_http_server().await,
    }
}
