mod audit;
mod cli;
mod commands;
mod settings;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Upload { path } => commands::upload::run(&path),
        Commands::Analyze {
            model,
            train,
            debug,
        } => commands::analyze::run(model, train, debug).await,
        Commands::Resume => commands::resume::run().await,
        Commands::Status => commands::status::run(),
        Commands::Latest => commands::latest::run(),
        Commands::Clear => commands::clear::run(),
        Commands::History {
            stats,
            key,
            hours,
            limit,
        } => commands::history::run(stats, key, hours, limit),
        Commands::Version => commands::version::run(),
    }
}
