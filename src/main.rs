use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sitefeed::app::AppContext;
use sitefeed::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `get` output stays pipeable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::load(cli.config.as_deref(), cli.ttl)?;

    match cli.command {
        Commands::Sites => {
            commands::list_sites(&ctx)?;
        }
        Commands::Get { site } => {
            let response = commands::get_feed(&ctx, &site).await;
            if !response.is_success() {
                anyhow::bail!("{} (status {})", response.body, response.status);
            }
        }
        Commands::Run => {
            commands::run(&ctx).await?;
        }
    }

    Ok(())
}
