use thiserror::Error;

use crate::types::{TARGET_TEMP_MAX, TARGET_TEMP_MIN};

/// Everything that can go wrong with an inbound event. None of these are
/// fatal: the router records a diagnostic and the system stays live.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("invalid payload '{payload}' for {field}")]
    MalformedPayload { field: &'static str, payload: String },

    #[error("invalid {field} command '{value}'")]
    InvalidCommand { field: &'static str, value: String },

    #[error("temperature {0} is out of range; must be between {TARGET_TEMP_MIN} and {TARGET_TEMP_MAX} degrees")]
    OutOfRange(i32),

    #[error("mode commands require the system to be on")]
    InvalidMode,

    #[error("occupancy is not tracked while the system is off")]
    NotTracking,

    #[error("invalid occupancy figure {0}; occupancy must be >= 0")]
    InvalidOccupancy(i32),
}
