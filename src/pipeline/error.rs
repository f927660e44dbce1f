//! Conditions raised by the pipeline core itself, as opposed to payload errors.

use std::fmt;
use std::sync::Arc;

/// Reason a scope was stopped. Shared so the driver and every task can read it after the fact.
pub type Cause = Arc<anyhow::Error>;

/// Causes the core records on its own (payload errors are passed through untouched).
#[derive(Debug)]
pub enum PipelineError {
    /// The scope's deadline passed before the pipeline finished.
    DeadlineExceeded,
    /// A registered task panicked; `message` is the panic payload when it was a string.
    TaskPanicked { task: String, message: String },
    /// The OS refused to start a thread for a registered task.
    Spawn {
        task: String,
        source: std::io::Error,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
            Self::TaskPanicked { task, message } => {
                write!(f, "task '{}' panicked: {}", task, message)
            }
            Self::Spawn { task, .. } => write!(f, "failed to spawn thread for task '{}'", task),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Why a cancellation-aware send or receive gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupted {
    /// The scope was cancelled first.
    Cancelled,
    /// Every peer on the other end of the channel is gone.
    Disconnected,
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "scope cancelled"),
            Self::Disconnected => write!(f, "channel disconnected"),
        }
    }
}

impl std::error::Error for Interrupted {}
