use thiserror::Error;

/// Errors raised by the synchronous parts of the overlay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid overlay configuration: {0}")]
    Config(String),
}

/// Failure of an info request. Never shown to the user as such; the popup
/// degrades to its "no data" state instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
}
