//! Pipeline Error Types
//!
//! Cancellation is not an error; it is reported through
//! [`TaskOutcome`](crate::pipeline::TaskOutcome).

use crate::core::error_handling::ContextualError;
use crate::pipeline::outcome::TaskRole;
use crate::queue::QueueError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Failed to spawn {role} thread: {source}")]
    Spawn {
        role: TaskRole,
        #[source]
        source: std::io::Error,
    },

    #[error("{role} thread panicked")]
    WorkerPanicked { role: TaskRole },

    #[error("Invalid pipeline settings: {message}")]
    InvalidSettings { message: String },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl ContextualError for PipelineError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, PipelineError::InvalidSettings { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PipelineError::InvalidSettings { message } => Some(message),
            _ => None,
        }
    }
}
