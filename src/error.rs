use thiserror::Error;

/// Errors from the expense log database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Reasons a fuel price fetch came back without prices.
#[derive(Debug, Error)]
pub enum PriceFetchError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price page returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("price table not found on the page, the site layout may have changed")]
    TableMissing,

    #[error("price table contained no usable rows")]
    NoRows,

    #[error("invalid selector '{0}'")]
    Selector(String),
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("input closed")]
    InputClosed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}
