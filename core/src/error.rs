//! Error types for the API client layer.
//!
//! # Design
//! Configuration problems (absent root URL, malformed service path, missing
//! collaborators) surface from `ApiClientBuilder::build`. Failures raised by
//! the injected transport are carried unmodified in `Transport`. Non-2xx
//! responses land in `Http` with the raw status and body, except 404 which
//! gets `NotFound` because callers routinely branch on it.

use thiserror::Error;

/// Boxed error produced by an `HttpTransport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the client, its builder and its collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("root URL cannot be absent")]
    MissingRootUrl,

    #[error("service path cannot be absent")]
    MissingServicePath,

    #[error("service path must equal \"/\" if it is of length 1, got {0:?}")]
    InvalidServicePath(String),

    #[error("no HTTP transport configured")]
    MissingTransport,

    #[error("no object parser configured")]
    MissingObjectParser,

    /// A request parameter did not match the pattern declared for it.
    #[error("parameter {name} must conform to the pattern {pattern}, got {value:?}")]
    PatternMismatch {
        name: String,
        value: String,
        pattern: String,
    },

    #[error("invalid parameter pattern {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no value for path parameter {0}")]
    MissingPathParameter(String),

    #[error("request initializer failed: {0}")]
    Initializer(String),

    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("batch request has no queued requests")]
    EmptyBatch,

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid settings: {0}")]
    Settings(String),
}
