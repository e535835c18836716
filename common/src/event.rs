/// Categories for the append-only event log. Every notable transition in the
/// core produces exactly one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PowerChanged,
    ModeChanged,
    TargetChanged,
    OccupancyChanged,
    PeerTemperature,
    LocalTemperature,
    PeerUnresponsive,
    SensorFailure,
    TimerArmed,
    TimerCancelled,
    TimerExpired,
    InvalidInput,
    Refresh,
    PeerLog,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PowerChanged => "POWER_CHANGED",
            Self::ModeChanged => "MODE_CHANGED",
            Self::TargetChanged => "TARGET_CHANGED",
            Self::OccupancyChanged => "OCCUPANCY_CHANGED",
            Self::PeerTemperature => "PEER_TEMPERATURE",
            Self::LocalTemperature => "LOCAL_TEMPERATURE",
            Self::PeerUnresponsive => "PEER_UNRESPONSIVE",
            Self::SensorFailure => "SENSOR_FAILURE",
            Self::TimerArmed => "TIMER_ARMED",
            Self::TimerCancelled => "TIMER_CANCELLED",
            Self::TimerExpired => "TIMER_EXPIRED",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Refresh => "REFRESH",
            Self::PeerLog => "PEER_LOG",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: EventKind,
    pub detail: String,
}

impl Notice {
    pub fn new(kind: EventKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}
