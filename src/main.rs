use clap::Parser;
use cumflow::cli::{run, Cli};
use cumflow::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
