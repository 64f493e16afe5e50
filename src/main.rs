use anyhow::Result;
use clap::Parser;
use vnstat_status::cli::{Cli, Commands, StatusCommandHandler};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut handler = StatusCommandHandler::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { interval, name } => {
            handler.handle_run_command(interval, &name).await?;
        }
        Commands::Once { json } => {
            handler.handle_once_command(json).await?;
        }
        Commands::Placeholders => {
            handler.handle_placeholders_command().await?;
        }
    }

    Ok(())
}
