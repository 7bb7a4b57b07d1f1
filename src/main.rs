use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use space_missions::{
    api,
    config::{ServerConfig, StoreConfig},
    seed,
};

#[derive(Parser)]
#[command(name = "space-missions")]
#[command(about = "Scientists, planets and missions over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(ServerConfig),
    /// Load demo planets, scientists and missions
    Seed {
        #[command(flatten)]
        store: StoreConfig,

        /// Delete all existing records first
        #[arg(long)]
        reset: bool,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "space_missions=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = config.store.open()?;
    let app = api::create_router(db);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("space-missions listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve(config)) => serve(config).await?,
        Some(Commands::Seed { store, reset }) => {
            let db = store.open()?;
            let summary = seed::seed(&db, reset)?;
            println!(
                "Seeded {} scientists, {} planets and {} missions",
                summary.scientists, summary.planets, summary.missions
            );
        }
        None => serve(ServerConfig::from_env()).await?,
    }

    Ok(())
}
