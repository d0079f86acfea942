use anyhow::Result;
use triage::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
