use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use murmur::app::AppContext;
use murmur::cli::{commands, Cli, Commands};
use murmur::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Read { url, overrides } => {
            overrides.apply(&mut config);
            let ctx = AppContext::new(config);
            commands::read(&ctx, &url, overrides.headful).await?;
        }
        Commands::Extract {
            url,
            json,
            overrides,
        } => {
            overrides.apply(&mut config);
            let ctx = AppContext::new(config);
            commands::extract(&ctx, &url, json, overrides.headful).await?;
        }
        Commands::Voices { locale } => {
            let ctx = AppContext::new(config);
            commands::voices(&ctx, locale.as_deref()).await?;
        }
    }

    Ok(())
}
