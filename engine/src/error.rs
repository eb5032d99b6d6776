//! ACL Engine Error Types

use acl_common::ValidationError;
use thiserror::Error;

/// Failure reported by (or while talking to) the object store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Non-2xx response.
    #[error("Object store returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
        ticket_id: Option<String>,
    },

    /// Connection failure or timeout.
    #[error("Object store request failed: {0}")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("Invalid object store response: {0}")]
    Decode(String),

    /// The store client could not be built from its configuration.
    #[error("Invalid object store configuration: {0}")]
    Config(String),
}

impl StoreError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors returned by ACL mutations and reconcilers.
#[derive(Debug, Error)]
pub enum AclError {
    /// Bad input, raised before any request is sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The object store rejected a request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AclError {
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, AclError>;
