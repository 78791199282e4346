//! Error types for the komal core library
//!
//! Every failure that can happen while resolving or applying metadata maps to
//! one variant here. Per-entry errors are turned into terminal entry states by
//! the orchestrator; only configuration and catalog listing errors are fatal.

use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the komal core library
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP client failure talking to an external service
    #[error("Request to {service} failed: {message}")]
    Transport { service: String, message: String },

    /// The service answered with a status code the caller does not accept
    #[error("{service} returned HTTP {status} for {endpoint}")]
    HttpStatus {
        service: String,
        endpoint: String,
        status: u16,
    },

    /// The service answered, but the body could not be understood
    #[error("Unexpected response from {service}: {message}")]
    InvalidResponse { service: String, message: String },

    /// Search returned no candidates or a fetch returned no record
    #[error("No record found for {what}")]
    NotFound { what: String },

    /// A locator could not be turned into an identifier
    #[error("Malformed locator '{locator}': {reason}")]
    MalformedLocator { locator: String, reason: String },

    /// The disambiguation answer pointed outside the offered candidates
    #[error("Invalid choice {index}: only {offered} candidate(s) were offered")]
    InvalidChoice { index: usize, offered: usize },

    /// No usable cached link and the operator may not be asked
    #[error("No cached link for '{name}' and prompting is not allowed")]
    NotCached { name: String },

    /// Required configuration is absent
    #[error("Missing required configuration: {field}")]
    ConfigurationMissing { field: String },

    /// The initial catalog listing could not be read
    #[error("Failed to list catalog series: {message}")]
    CatalogListing { message: String },

    /// A durable store (identifier cache, processed log) could not be written
    #[error("Failed to persist {store}: {message}")]
    Persistence { store: String, message: String },

    /// The interactive prompt could not be shown or read
    #[error("Prompt failed: {message}")]
    Prompt { message: String },

    /// Plain I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(service: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.to_string(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(service: &str, endpoint: &str, status: u16) -> Self {
        Self::HttpStatus {
            service: service.to_string(),
            endpoint: endpoint.to_string(),
            status,
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(service: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service: service.to_string(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a malformed locator error
    pub fn malformed_locator(locator: &str, reason: impl Into<String>) -> Self {
        Self::MalformedLocator {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a not cached error
    pub fn not_cached(name: &str) -> Self {
        Self::NotCached {
            name: name.to_string(),
        }
    }

    /// Create a missing configuration error
    pub fn configuration_missing(field: &str) -> Self {
        Self::ConfigurationMissing {
            field: field.to_string(),
        }
    }

    /// Create a catalog listing error
    pub fn catalog_listing(message: impl Into<String>) -> Self {
        Self::CatalogListing {
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(store: &str, message: impl Into<String>) -> Self {
        Self::Persistence {
            store: store.to_string(),
            message: message.into(),
        }
    }

    /// Create a prompt error
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt {
            message: message.into(),
        }
    }

    /// Errors that must stop a run before any entry is processed
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing { .. } | Self::CatalogListing { .. }
        )
    }

    /// Errors that might succeed if the same request is made again later
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::HttpStatus { status, .. } => matches!(status, 429 | 500..=504),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let service = err
            .url()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "remote service".to_string());

        if err.is_decode() {
            return Self::InvalidResponse {
                service,
                message: err.to_string(),
            };
        }

        Self::Transport {
            service,
            message: err.to_string(),
        }
    }
}
