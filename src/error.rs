//! Error type shared by the API client, the views and the page renderer

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status { status: StatusCode, url: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render page: {0}")]
    Render(#[from] handlebars::RenderError),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// How a failure is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// Fetch rejected, timed out or answered with a non-2xx status
    Network,
    /// Credential missing or wrong
    Authentication,
    /// Rejected locally before any request was sent
    Validation,
    /// Configuration, file or rendering problem on this machine
    Local,
}

impl Error {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_) | Error::Status { .. } => ErrorKind::Network,
            // A body that does not match the contract is a server-side problem
            Error::Json(_) => ErrorKind::Network,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Config(_) | Error::Io(_) | Error::Render(_) => ErrorKind::Local,
        }
    }

    /// Message shown in banners and toasts
    pub(crate) fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Network => "Failed to load data from the server".to_string(),
            ErrorKind::Authentication => "Incorrect password. Nothing was deleted.".to_string(),
            ErrorKind::Validation => match self {
                Error::Validation(msg) => msg.clone(),
                other => other.to_string(),
            },
            ErrorKind::Local => self.to_string(),
        }
    }
}
