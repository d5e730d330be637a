use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    Validation,
    Unauthorized,
    NotFound,
    Network,
    Server,
}

impl ErrorReason {
    /// 401 means the session cookie is gone; 403 is a refusal for a live session
    /// and stays a server error so it never logs the user out.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorReason::Unauthorized,
            404 => ErrorReason::NotFound,
            _ => ErrorReason::Server,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorReason::Validation => "validation",
            ErrorReason::Unauthorized => "unauthorized",
            ErrorReason::NotFound => "not_found",
            ErrorReason::Network => "network",
            ErrorReason::Server => "server",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{reason}: {message}")]
pub struct ApiError {
    pub reason: ErrorReason,
    pub message: String,
}

impl ApiError {
    pub fn new(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorReason::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorReason::Network, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorReason::Server, message)
    }

    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorReason::from_status(status), message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.reason == ErrorReason::Unauthorized
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
