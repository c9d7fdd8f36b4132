//! CLI entry point - the composition root.
//!
//! Parses arguments, initialises logging and routes each command to its
//! handler. In-process commands share one `AnirentService`, which is shut
//! down and drained before exit.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use anirent_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("invalid log filter {filter:?} ({e}); falling back to \"warn\"");
        EnvFilter::new("warn")
    });
    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so env-backed flags see it.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = CliConfig {
        data_dir: cli.data_dir.clone(),
    };

    match cli.command {
        Commands::Serve { addr, cors_origins } => {
            handlers::serve::execute(&config, addr, cors_origins).await
        }
        Commands::Search { name, resolutions } => {
            let ctx = bootstrap(&config)?;
            let outcome = handlers::search::execute(&ctx, name, resolutions).await;
            ctx.service.shutdown();
            ctx.service.drain().await;
            outcome
        }
        Commands::Download { result, dir, plex } => {
            let ctx = bootstrap(&config)?;
            let outcome = handlers::download::execute(&ctx, &result, &dir, plex).await;
            ctx.service.shutdown();
            ctx.service.drain().await;
            outcome
        }
    }
}
