// ⚠️ Errors - Table store failures and configuration failures
//
// Fetch errors never reach a page: the dashboard logs them and substitutes
// a fallback collection for the dataset. Config errors stop startup.

use thiserror::Error;

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum FetchError {
    /// The store has no table (or file) by that name
    #[error("table not found: {0}")]
    MissingTable(String),

    /// Table names are spliced into SQL and file paths, so only plain
    /// identifiers are accepted
    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),

    /// The store answered but the payload is not a list of records
    #[error("malformed payload for table {table}: {reason}")]
    Malformed { table: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The blocking worker running the query panicked or was cancelled
    #[error("fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Table configuration could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown dataset in config: {0}")]
    UnknownDataset(String),

    #[error("invalid table name for {dataset}: {name:?}")]
    InvalidTableName { dataset: String, name: String },
}

impl FetchError {
    pub fn malformed(table: &str, reason: impl Into<String>) -> Self {
        FetchError::Malformed {
            table: table.to_string(),
            reason: reason.into(),
        }
    }
}
