//! Server configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | WORK_DIR | /var/lib/order-sync | Working directory (database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | DATABASE_PATH | {WORK_DIR}/sync.db | SQLite database file |
//! | API_KEY | generated | Pre-shared marketplace API key |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | LOG_LEVEL | info | tracing filter level |

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// Pre-shared API key every marketplace request must carry
    pub api_key: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Log filter level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables, using defaults for
    /// anything unset. A missing API_KEY is generated and logged so a
    /// development setup works out of the box.
    pub fn from_env() -> Self {
        let work_dir =
            std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/order-sync".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{}/sync.db", work_dir));
        let api_key = std::env::var("API_KEY").unwrap_or_else(|_| {
            let generated = Uuid::new_v4().to_string();
            tracing::warn!(api_key = %generated, "API_KEY not set, generated a one-off key");
            generated
        });

        Self {
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            api_key,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// Override the paths and port, typically for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = format!("{}/sync.db", config.work_dir);
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
