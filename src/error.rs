use thiserror::Error;

/// Everything that can go wrong while resolving threads, keys or zaps.
#[derive(Debug, Error)]
pub enum Error {
    /// A `zap` tag names an encoding other than `lud06` or `lud16`.
    #[error("unsupported zap tag encoding `{0}`")]
    UnsupportedZapTagEncoding(String),

    /// No Lightning address was found, or its endpoint does not accept zaps.
    #[error("no zap endpoint found")]
    NoZapEndpoint,

    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not sign event: {0}")]
    Signing(String),

    /// Callback answered without a `pr` field.
    #[error("payment endpoint returned no invoice{}", .0.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    MissingInvoice(Option<String>),

    #[error("relay failure: {0}")]
    Relay(String),

    #[error("invalid key or identifier: {0}")]
    InvalidKey(String),

    #[error("could not open identity: {0}")]
    Identity(String),

    #[error(transparent)]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
