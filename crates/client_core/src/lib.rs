//! Client for the topic-learning service: session state, service gateway,
//! presentation tree and the controller tying them together.

pub mod config;
pub mod error;
pub mod service;
pub mod session;
pub mod state;
pub mod view;

pub use config::{load_settings, ClientSettings};
pub use error::{FailureCategory, GatewayError};
pub use service::{HttpLearningService, LearningService};
pub use session::LearningSession;
pub use state::{SessionState, SubsystemStatus};
pub use view::{render, AppView, UserIntent};
