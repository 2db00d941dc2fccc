use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while serving a request or starting the server.
///
/// Request-scoped variants are turned into an HTTP response by the [`Dispatcher`]: they never
/// escape the request they were raised for.
///
/// [`Dispatcher`]: crate::Dispatcher
#[derive(Debug, Error)]
pub enum Error {
    /// No route is registered for this method and normalized path.
    #[error("Error: no API matched {method} '{path}'")]
    NoRouteMatched { method: String, path: String },

    /// A generator needed a structured body and could not parse the one it got.
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Failed to read fixture `{name}`: {source}")]
    MissingFixture {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
