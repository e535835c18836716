use serde::{Deserialize, Serialize};

/// Allowed target temperatures for the actuator, degrees Celsius.
pub const TARGET_TEMP_MIN: i32 = 16;
pub const TARGET_TEMP_MAX: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Parses the exact wire literals; anything else is rejected.
    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Quiet,
    Super,
    Cooling,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Super => "super",
            Self::Cooling => "cooling",
        }
    }

    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            "quiet" => Some(Self::Quiet),
            "super" => Some(Self::Super),
            "cooling" => Some(Self::Cooling),
            _ => None,
        }
    }
}

/// Point-in-time view of the whole system, published in answer to a refresh
/// request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub power: &'static str,
    pub mode: Option<&'static str>,
    #[serde(rename = "targetTemp")]
    pub target_temp: i32,
    pub occupancy: Option<u32>,
    #[serde(rename = "peerAvailable")]
    pub peer_available: bool,
    #[serde(rename = "localTemp")]
    pub local_temp: Option<f32>,
    #[serde(rename = "peerTemp")]
    pub peer_temp: Option<f32>,
    /// Wall-clock time the vacancy timeout fires, "%H:%M", or "N/A" when no
    /// timer is armed.
    #[serde(rename = "timerDeadline")]
    pub timer_deadline: String,
}
