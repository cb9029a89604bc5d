//! Server configuration.
//!
//! All settings load from environment variables with sensible defaults:
//!
//! | Environment variable     | Default                 | Meaning                         |
//! |--------------------------|-------------------------|---------------------------------|
//! | WORK_DIR                 | ./work_dir              | Logs and the default database   |
//! | HTTP_PORT                | 3000                    | HTTP API port                   |
//! | DATABASE_URL             | sqlite://<WORK_DIR>/checkout.db | SQLite database        |
//! | ENVIRONMENT              | development             | development \| production       |
//! | RESERVATION_TTL_SECS     | 900                     | Default checkout hold duration  |
//! | RESERVATION_SWEEP_SECS   | 60                      | Background expiry sweep period  |
//! | ORDER_LIST_LIMIT         | 100                     | Max rows for order list queries |

#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub database_url: String,
    /// development | production (production logs JSON to file)
    pub environment: String,
    /// How long a checkout hold lives before expiring on its own.
    pub reservation_ttl_secs: u64,
    /// Period of the background sweep that deletes expired holds. The
    /// sweep is an optimization; reads already ignore expired rows.
    pub reservation_sweep_secs: u64,
    pub order_list_limit: i64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{work_dir}/checkout.db"));
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            reservation_ttl_secs: std::env::var("RESERVATION_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(900),
            reservation_sweep_secs: std::env::var("RESERVATION_SWEEP_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            order_list_limit: std::env::var("ORDER_LIST_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(100),
            work_dir,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn reservation_ttl_millis(&self) -> i64 {
        self.reservation_ttl_secs as i64 * 1000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
