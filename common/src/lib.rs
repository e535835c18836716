pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod router;
pub mod state;
pub mod timeout;
pub mod topics;
pub mod types;

pub use config::{ControlConfig, NetworkConfig};
pub use engine::{ControlEngine, EngineAction, Outcome};
pub use error::CommandError;
pub use event::{EventKind, Notice};
pub use router::{dispatch, Inbound};
pub use state::{PowerTransition, SystemState};
pub use timeout::{CancelReason, TimerEvent, VacancyTimer};
pub use topics::*;
pub use types::{Mode, Power, StatusSnapshot, TARGET_TEMP_MAX, TARGET_TEMP_MIN};
