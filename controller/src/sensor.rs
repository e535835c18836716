use thiserror::Error;

/// Transient local read failure. Skips the rest of the current poll period;
/// the next period retries.
#[derive(Debug, Error)]
#[error("local sensor read failed: {0}")]
pub struct SensorError(pub String);

/// One local temperature sensor, read once per poll period.
pub trait SensorDriver: Send {
    fn read_temperature(&mut self) -> Result<f32, SensorError>;
}

/// Host-side stand-in for the DHT sensor: a slowly drifting reading with the
/// occasional transient failure, which these sensors produce in practice.
pub struct SimulatedSensor {
    reads: u64,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self { reads: 0 }
    }
}

impl SensorDriver for SimulatedSensor {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.reads = self.reads.saturating_add(1);
        if self.reads % 12 == 0 {
            return Err(SensorError("checksum mismatch".to_string()));
        }
        Ok(23.0 + ((self.reads % 8) as f32 * 0.2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_sensor_fails_transiently_then_recovers() {
        let mut sensor = SimulatedSensor::new();
        let results: Vec<bool> = (0..24).map(|_| sensor.read_temperature().is_ok()).collect();

        assert_eq!(results.iter().filter(|ok| !**ok).count(), 2);
        assert!(!results[11]);
        assert!(results[12]);
    }
}
