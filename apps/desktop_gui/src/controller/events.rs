//! Backend-to-UI events and error modeling for the desktop GUI controller.

use std::fmt;

use client_core::AppView;

pub enum UiEvent {
    Info(String),
    View(Box<AppView>),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Configuration,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Configuration,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if context == UiErrorContext::Configuration
            || message_lower.contains("invalid server url")
            || message_lower.contains("must use http")
        {
            UiErrorCategory::Configuration
        } else if message_lower.contains("http client")
            || message_lower.contains("tls")
            || message_lower.contains("connection")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn requires_relaunch(&self) -> bool {
        self.context == UiErrorContext::BackendStartup
            || self.category == UiErrorCategory::Configuration
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            UiErrorCategory::Configuration => write!(
                f,
                "Configuration error: {}. Fix pathfinder.toml or --server-url and relaunch.",
                self.message
            ),
            UiErrorCategory::Transport | UiErrorCategory::Unknown => match self.context {
                UiErrorContext::BackendStartup => {
                    write!(f, "Backend worker startup failure: {}", self.message)
                }
                UiErrorContext::Configuration => write!(f, "{}", self.message),
            },
        }
    }
}
