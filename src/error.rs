use thiserror::Error;

use crate::quiz::QuestionOrigin;

/// Errors surfaced by the gate core.
///
/// Only `InsufficientContent` is part of the user-facing flow; the session
/// recovers from it by exempting the post. `InvalidSample` is reported by the
/// tracker and dropped by the session. `InvalidTransition` is a caller bug.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GateError {
    #[error(
        "content too short to test ({origin} pool has {available} of {required} questions) - you may still share without a quiz"
    )]
    InsufficientContent {
        origin: QuestionOrigin,
        required: usize,
        available: usize,
    },

    #[error("invalid block sample: {0}")]
    InvalidSample(String),

    #[error("cannot {action} while gate is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
}

pub type GateResult<T> = std::result::Result<T, GateError>;
