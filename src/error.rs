use thiserror::Error;

/// Errors surfaced by the geoportal client.
///
/// None of these are fatal to the page: callers log them and degrade
/// (missing tiles, hidden popup, inline form message, startup banner).
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("GeoServer is unreachable at {endpoint}: {reason}")]
    ServerUnreachable { endpoint: String, reason: String },

    #[error("HTTP error {status} for {url}")]
    Http { status: u16, url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("{0}")]
    Auth(String),

    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("element #{0} not found")]
    MissingElement(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PortalError>;

impl From<gloo::net::Error> for PortalError {
    fn from(err: gloo::net::Error) -> Self {
        match err {
            gloo::net::Error::SerdeError(e) => PortalError::Parse(e.to_string()),
            other => PortalError::Network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Parse(err.to_string())
    }
}
