use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use emberfeed::app::AppContext;
use emberfeed::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.config.as_deref())?;

    match cli.command {
        Commands::Sources => {
            commands::list_sources(&ctx).await?;
        }
        Commands::Hot { ids, timeout } => {
            commands::hot_news(&ctx, &ids, timeout).await?;
        }
        Commands::Article { url } => {
            commands::article(&ctx, &url).await?;
        }
        Commands::Page { url } => {
            commands::page(&ctx, &url).await?;
        }
        Commands::Watch { interval } => {
            commands::watch(&ctx, interval).await?;
        }
    }

    Ok(())
}
