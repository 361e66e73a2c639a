//! Failure taxonomy for calls made through the learning service.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// A local precondition failed and nothing was sent.
    Validation,
    /// The service answered with a non-success status.
    Remote,
    /// The service answered successfully but the payload lacked what was asked for.
    MalformedResponse,
    /// Connection, timeout or body decoding failure.
    Transport,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),
    #[error("Backend error: {status} - {message}")]
    Remote { status: u16, message: String },
    #[error("{0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("unreadable response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Validation(_) => FailureCategory::Validation,
            Self::Remote { .. } => FailureCategory::Remote,
            Self::MalformedResponse(_) => FailureCategory::MalformedResponse,
            Self::Transport(_) | Self::Decode(_) => FailureCategory::Transport,
        }
    }

    /// Text shown to the user in the failing subsystem's error slot.
    ///
    /// Local validation and malformed payload messages are already phrased for the
    /// user; remote and transport failures get the subsystem's prefix and a hint
    /// that the service may be down.
    pub fn display_for(&self, failure_prefix: &str) -> String {
        match self.category() {
            FailureCategory::Validation | FailureCategory::MalformedResponse => self.to_string(),
            FailureCategory::Remote | FailureCategory::Transport => format!(
                "{failure_prefix}: {self}. Ensure the learning service is running."
            ),
        }
    }
}
