use thiserror::Error;

/// Error taxonomy shared across stage boundaries (spec.md §7). Low-level I/O
/// retries internally; each stage translates failures into one of these
/// kinds before handing control back to the scheduler or CLI.
#[derive(Error, Debug)]
pub enum SportwireError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("fetch error (transient): {0}")]
    FetchTransient(String),

    #[error("fetch error (permanent): {0}")]
    FetchPermanent(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: f64 },

    #[error("dispatch error: {0}")]
    Dispatch(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl SportwireError {
    /// Maps the error taxonomy onto spec.md §6 CLI exit codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            SportwireError::Config(_) => 1,
            SportwireError::Dispatch(_) | SportwireError::RateLimited { .. } => 2,
            SportwireError::Invariant(_) => 3,
            SportwireError::FetchTransient(_)
            | SportwireError::FetchPermanent(_)
            | SportwireError::Parse(_)
            | SportwireError::Store(_)
            | SportwireError::Anyhow(_) => 2,
        }
    }
}
