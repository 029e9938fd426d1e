use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsroom::{api, config::Config, scrape::Scraper};

#[derive(Parser)]
#[command(name = "newsroom")]
#[command(about = "Scrape news headlines, save the ones worth keeping, and annotate them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (the default)
    Serve {
        /// Port for HTTP (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite path or `:memory:` (overrides DATABASE_URL)
        #[arg(long)]
        database: Option<String>,
    },
    /// Scrape the source page once and wait for every insert
    Scrape {
        /// Page to scrape (overrides SCRAPE_URL)
        #[arg(long)]
        url: Option<String>,

        /// SQLite path (overrides DATABASE_URL)
        #[arg(long)]
        database: Option<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "newsroom=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let db = config.open_database()?;
    let scraper = Scraper::new(&config.scrape)?;
    let app = api::create_router_with_assets(db, scraper, &config.public_dir);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Newsroom listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn scrape_once(config: Config) -> anyhow::Result<()> {
    let db = config.open_database()?;
    let scraper = Scraper::new(&config.scrape)?;

    let report = scraper.run(&db).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { port, database }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if database.is_some() {
                config.database_url = database;
            }
            serve(config).await?;
        }
        Some(Commands::Scrape { url, database }) => {
            if let Some(url) = url {
                config.scrape.source_url = url;
            }
            if database.is_some() {
                config.database_url = database;
            }
            scrape_once(config).await?;
        }
        None => serve(config).await?,
    }

    Ok(())
}
