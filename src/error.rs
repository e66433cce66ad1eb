// Client error types for the admin API
use serde_json::{json, Value};
use thiserror::Error;

/// Message shown for any request that never received a response.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

/// Everything that can go wrong between the console and the admin API.
///
/// Variants follow how the console reacts to them: transport failures get a
/// generic connectivity message, unauthorized responses end the session,
/// business errors are shown verbatim and leave state untouched.
#[derive(Debug, Error)]
pub enum ClientError {
    // No response received (DNS, refused connection, timeout)
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Transport(#[source] reqwest::Error),

    // 401 Unauthorized
    #[error("{0}")]
    Unauthorized(String),

    // 4xx / 5xx carrying a message
    #[error("{message}")]
    Api { status: u16, message: String },

    // 2xx whose body could not be understood
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    // Operation not allowed in the current local state
    #[error("{0}")]
    IllegalState(String),

    // Persisted session storage could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),

    // Rejected locally before any request was sent
    #[error("{message}")]
    Validation { field: &'static str, message: String },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

impl ClientError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ClientError::Unauthorized(message.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ClientError::Decode(message.into())
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        ClientError::IllegalState(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ClientError::Storage(message.into())
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ClientError::Validation {
            field,
            message: message.into(),
        }
    }

    /// HTTP status associated with the error, when one was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the operator
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Stable code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Unauthorized(_) => "UNAUTHORIZED",
            ClientError::Api { status, .. } if *status >= 500 => "SERVER_ERROR",
            ClientError::Api { .. } => "REQUEST_REJECTED",
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::IllegalState(_) => "ILLEGAL_STATE",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// Convert to the JSON shape the CLI prints with `--json`
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });
        if let Some(status) = self.status_code() {
            body["status"] = json!(status);
        }
        if let ClientError::Validation { field, .. } = self {
            body["field"] = json!(field);
        }
        body
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}
