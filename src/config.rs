//! Runtime configuration read from environment variables.
//!
//! | Variable              | Default                          |
//! |-----------------------|----------------------------------|
//! | `HOST`                | `127.0.0.1`                      |
//! | `PORT`                | `3000`                           |
//! | `DATABASE_URL`        | `newsroom.db` in the data dir    |
//! | `PUBLIC_DIR`          | `public`                         |
//! | `SCRAPE_URL`          | `http://www.thehorse.com/news`   |
//! | `SCRAPE_SELECTOR`     | `h2`                             |
//! | `SCRAPE_TIMEOUT_SECS` | `30`                             |

use std::path::PathBuf;

use crate::db::Database;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SOURCE_URL: &str = "http://www.thehorse.com/news";
pub const DEFAULT_HEADING_SELECTOR: &str = "h2";

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite connection string. `None` uses the platform data directory.
    pub database_url: Option<String>,
    /// Directory of static assets served for unrouted paths.
    pub public_dir: PathBuf,
    pub scrape: ScrapeConfig,
}

/// Where and how the scraper fetches headlines.
#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    pub source_url: String,
    /// CSS selector matching one heading per article.
    pub heading_selector: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            heading_selector: DEFAULT_HEADING_SELECTOR.to_string(),
            timeout_secs: 30,
            user_agent: concat!("newsroom/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Scrape a different page with otherwise default settings.
    pub fn with_source_url(url: impl Into<String>) -> Self {
        Self {
            source_url: url.into(),
            ..Self::default()
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ScrapeConfig::default();

        let port = var("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let timeout_secs = var("SCRAPE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database_url: var("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            public_dir: var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            scrape: ScrapeConfig {
                source_url: var("SCRAPE_URL").unwrap_or(defaults.source_url),
                heading_selector: var("SCRAPE_SELECTOR").unwrap_or(defaults.heading_selector),
                timeout_secs,
                user_agent: defaults.user_agent,
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.database_url {
            Some(url) => Database::open_url(url)?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}
