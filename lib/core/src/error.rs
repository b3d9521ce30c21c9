use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("{kind} vector has {actual} interpretable features, expected {expected} ({breakdown})")]
    SchemaMismatch {
        kind: String,
        expected: usize,
        actual: usize,
        breakdown: String,
    },

    #[error("Missing required data: {field}")]
    MissingRequiredData { field: String },

    #[error("{provider} embedding has dimension {actual}, expected {expected}")]
    EmbeddingDimension {
        provider: String,
        expected: usize,
        actual: usize,
    },

    #[error("Embedding provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Shorthand for a missing report/token field, named by its dotted path
    pub fn missing(field: impl Into<String>) -> Self {
        Error::MissingRequiredData {
            field: field.into(),
        }
    }
}

/// Failures reported by an external embedding provider.
///
/// These are surfaced as-is; retry and backoff belong to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("authentication failed: {0} (check the provider API key)")]
    Authentication(String),

    #[error("rate limited by provider{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}
