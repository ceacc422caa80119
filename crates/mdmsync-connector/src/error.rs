//! Connector error types
//!
//! Errors are classified as transport (the request did not produce a usable
//! success response), data-shape (a success response could not be decoded)
//! or configuration. Callers decide locally whether to skip-and-count or
//! propagate.

use thiserror::Error;

/// Error that can occur while talking to a backend.
#[derive(Debug, Error)]
pub enum ConnectorError {
    // Transport errors
    /// The request could not be sent or no response arrived.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The backend rejected the credentials.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    /// The backend kept answering 429 after every permitted retry.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    // Data-shape errors
    /// A success response had a body that could not be decoded.
    #[error("invalid data: {message}")]
    InvalidData {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Configuration errors
    /// Backend configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl ConnectorError {
    /// Create a connection failure with an underlying cause.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a data-shape error without a cause.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        ConnectorError::InvalidData {
            message: message.into(),
            source: None,
        }
    }

    /// Create a data-shape error with an underlying cause.
    pub fn invalid_data_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::InvalidData {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ConnectorError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// True when the request never produced a usable success response.
    ///
    /// Authentication failures are reported here too: the backend gives no
    /// better signal than a rejected call.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ConnectorError::ConnectionFailed { .. }
                | ConnectorError::Http { .. }
                | ConnectorError::AuthenticationFailed
                | ConnectorError::RateLimited { .. }
        )
    }

    /// True when a success response carried a body of the wrong shape.
    pub fn is_data_shape(&self) -> bool {
        matches!(self, ConnectorError::InvalidData { .. })
    }

    /// HTTP status code, when the backend answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ConnectorError::Http { status, .. } => Some(*status),
            ConnectorError::AuthenticationFailed => Some(401),
            ConnectorError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Short label for reports: the status code if known, else the error class.
    pub fn report_code(&self) -> String {
        match self.status_code() {
            Some(code) => code.to_string(),
            None if self.is_data_shape() => "invalid-response".to_string(),
            None => "transport-error".to_string(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
