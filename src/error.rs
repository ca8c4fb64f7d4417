//! Error types for the `CityWeather` application

use thiserror::Error;

/// Failure of a single upstream lookup (weather provider or geolocation).
///
/// Clients return `Result<T, FetchError>`; handlers match on the variant to
/// pick the message shown to the user. The detail string is for operators only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network or connectivity problem reaching the upstream (DNS, connect, timeout)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Upstream answered but reported an application-level failure
    #[error("Upstream reported failure: {message}")]
    Semantic { message: String },

    /// Anything not anticipated, including malformed payloads
    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

impl FetchError {
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn semantic<S: Into<String>>(message: S) -> Self {
        Self::Semantic {
            message: message.into(),
        }
    }

    pub fn unexpected<S: Into<String>>(message: S) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Short tag used as a structured log field
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Semantic { .. } => "semantic",
            FetchError::Unexpected { .. } => "unexpected",
        }
    }

    /// The bare detail without the kind prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            FetchError::Transport { message }
            | FetchError::Semantic { message }
            | FetchError::Unexpected { message } => message,
        }
    }

    /// Emit the operator-facing diagnostic for this failure
    pub fn log(&self, upstream: &str) {
        match self {
            FetchError::Semantic { .. } => {
                tracing::warn!(upstream, kind = self.kind(), "{}", self.message());
            }
            _ => {
                tracing::error!(upstream, kind = self.kind(), "{}", self.message());
            }
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string
        let err = err.without_url();
        if err.is_decode() {
            FetchError::unexpected(err.to_string())
        } else {
            FetchError::transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::unexpected(format!("Malformed payload: {err}"))
    }
}

/// Startup and bootstrap errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP client construction errors
    #[error("HTTP client error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and environment.")
            }
            AppError::Http { .. } => "Unable to initialise the HTTP client.".to_string(),
            AppError::Io { .. } => {
                "Network or file operation failed. Is the port already in use?".to_string()
            }
        }
    }
}
