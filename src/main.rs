//! Command-line front end of the academic planner.

mod cli;

use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run().await
}
