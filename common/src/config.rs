use serde::{Deserialize, Serialize};

use crate::types::{TARGET_TEMP_MAX, TARGET_TEMP_MIN};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Minutes of sustained vacancy before the system powers itself off.
    pub timeout_minutes: u64,
    /// Fast tick driving quiet-mode and vacancy-timer evaluation.
    pub tick_interval_ms: u64,
    /// Slow period for the peer temperature poll and local sensor read.
    pub poll_interval_ms: u64,
    /// Minimum spacing between dependent actuator commands; the peer relays
    /// them over IR and drops frames sent back to back.
    pub command_gap_ms: u64,
    /// Power-on default for the target temperature.
    pub initial_target_temp: i32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: 5,
            tick_interval_ms: 1_000,
            poll_interval_ms: 60_000,
            command_gap_ms: 500,
            initial_target_temp: TARGET_TEMP_MIN,
        }
    }
}

impl ControlConfig {
    pub fn sanitize(&mut self) {
        self.timeout_minutes = self.timeout_minutes.clamp(1, 1_440);
        self.tick_interval_ms = self.tick_interval_ms.clamp(100, 10_000);
        self.poll_interval_ms = self.poll_interval_ms.clamp(self.tick_interval_ms, 3_600_000);
        self.command_gap_ms = self.command_gap_ms.clamp(100, 5_000);
        self.initial_target_temp = self
            .initial_target_temp
            .clamp(TARGET_TEMP_MIN, TARGET_TEMP_MAX);
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_minutes * 60_000
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_user: String,
    pub mqtt_pass: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mqtt_host: "127.0.0.1".to_string(),
            mqtt_port: 1883,
            mqtt_user: String::new(),
            mqtt_pass: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sanitize_clamps_out_of_bounds_values() {
        let mut config = ControlConfig {
            timeout_minutes: 0,
            tick_interval_ms: 5,
            poll_interval_ms: 50,
            command_gap_ms: 9_000,
            initial_target_temp: 40,
        };
        config.sanitize();

        assert_eq!(config.timeout_minutes, 1);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.command_gap_ms, 5_000);
        assert_eq!(config.initial_target_temp, TARGET_TEMP_MAX);
    }

    #[test]
    fn default_timeout_is_five_minutes() {
        assert_eq!(ControlConfig::default().timeout_ms(), 300_000);
    }
}
