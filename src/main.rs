use clap::Parser;
use tracing_subscriber::EnvFilter;

use tempo_sync::cli::Cli;
use tempo_sync::coordinator::SyncCoordinator;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TEMPO_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    match SyncCoordinator::run(&cli).await {
        Ok(summary) => {
            if !summary.is_empty() {
                println!("{summary}");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{err:?}");
            std::process::exit(1);
        }
    }
}
