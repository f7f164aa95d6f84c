use thiserror::Error;

/// Fetch-stage error taxonomy (spec.md §4.1, §7). Transient errors are
/// worth retrying by the caller with jittered backoff; permanent ones mean
/// this article/page is skipped and the pipeline moves on.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transient fetch failure: {0}")]
    Transient(String),

    #[error("permanent fetch failure: {0}")]
    Permanent(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

impl From<FetchError> for sportwire_common::error::SportwireError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Transient(msg) => sportwire_common::error::SportwireError::FetchTransient(msg),
            FetchError::Permanent(msg) => sportwire_common::error::SportwireError::FetchPermanent(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
