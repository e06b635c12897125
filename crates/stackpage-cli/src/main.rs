use clap::Parser;
use stackpage_cli::{CliArgs, StackpageCli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let cli = StackpageCli::from_args("stackpage", &args)?;
    cli.run(args).await?;
    Ok(())
}
