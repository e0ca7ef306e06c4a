//! Error types of the metric pipeline

use thiserror::Error;

/// Failure of a metric source call
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0} metrics are not provided by this source")]
    Unsupported(&'static str),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    #[error("remote query failed: {0}")]
    Remote(String),
}

/// Failure of one plugin sampling pass
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("remote field `{0}` is unavailable")]
    RemoteUnavailable(String),
}

/// Failure while turning a snapshot into display lines
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed content: {0}")]
    Malformed(String),

    #[error("snapshot is missing `{0}`")]
    MissingField(String),
}
