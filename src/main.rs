use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scrollharvest::app::AppContext;
use scrollharvest::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut ctx = AppContext::new(cli.config)?;

    match cli.command {
        Commands::Run {
            posts,
            offset,
            workers,
            sink,
            sink_url,
            database,
        } => {
            if let Some(kind) = sink {
                ctx.config.sink.kind = kind;
            }
            if let Some(url) = sink_url {
                ctx.config.sink.url = url;
            }
            if database.is_some() {
                ctx.config.sink.database = database;
            }
            commands::run_harvest(&ctx, posts, offset, workers).await?;
        }
        Commands::List => {
            commands::list_entries(&ctx)?;
        }
        Commands::Config => {
            commands::show_config_path(&ctx);
        }
    }

    Ok(())
}
