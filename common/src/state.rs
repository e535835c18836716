use crate::{
    error::CommandError,
    types::{Mode, Power, TARGET_TEMP_MAX, TARGET_TEMP_MIN},
};

/// Result of a `set_power` call, so callers can react to the edge rather
/// than the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    Unchanged,
    TurnedOn,
    TurnedOff,
}

/// The authoritative in-memory model of the system. All mutation goes
/// through the named operations below; each one re-establishes the state
/// invariants before returning, so no caller can observe a half-applied
/// transition.
#[derive(Debug, Clone)]
pub struct SystemState {
    power: Power,
    mode: Option<Mode>,
    target_temp: i32,
    occupancy: Option<u32>,
    peer_available: bool,
    local_temp: Option<f32>,
    peer_temp: Option<f32>,
}

impl SystemState {
    pub fn new(initial_target_temp: i32) -> Self {
        Self {
            power: Power::Off,
            mode: None,
            target_temp: initial_target_temp.clamp(TARGET_TEMP_MIN, TARGET_TEMP_MAX),
            occupancy: None,
            // No poll is outstanding yet, so the peer has not missed one.
            peer_available: true,
            local_temp: None,
            peer_temp: None,
        }
    }

    pub fn power(&self) -> Power {
        self.power
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn target_temp(&self) -> i32 {
        self.target_temp
    }

    pub fn occupancy(&self) -> Option<u32> {
        self.occupancy
    }

    pub fn peer_available(&self) -> bool {
        self.peer_available
    }

    pub fn local_temp(&self) -> Option<f32> {
        self.local_temp
    }

    pub fn peer_temp(&self) -> Option<f32> {
        self.peer_temp
    }

    /// Off->On forces super mode and starts occupancy tracking at 0 unless
    /// an operator override already supplied a count. On->Off clears mode
    /// and occupancy. Repeating the current power state is a successful
    /// no-op.
    pub fn set_power(&mut self, power: Power) -> PowerTransition {
        if power == self.power {
            return PowerTransition::Unchanged;
        }
        self.power = power;
        match power {
            Power::On => {
                self.mode = Some(Mode::Super);
                if self.occupancy.is_none() {
                    self.occupancy = Some(0);
                }
                PowerTransition::TurnedOn
            }
            Power::Off => {
                self.mode = None;
                self.occupancy = None;
                PowerTransition::TurnedOff
            }
        }
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<bool, CommandError> {
        if self.power == Power::Off {
            return Err(CommandError::InvalidMode);
        }
        if self.mode == Some(mode) {
            return Ok(false);
        }
        self.mode = Some(mode);
        Ok(true)
    }

    pub fn set_target_temp(&mut self, temp: i32) -> Result<bool, CommandError> {
        if !(TARGET_TEMP_MIN..=TARGET_TEMP_MAX).contains(&temp) {
            return Err(CommandError::OutOfRange(temp));
        }
        if self.target_temp == temp {
            return Ok(false);
        }
        self.target_temp = temp;
        Ok(true)
    }

    /// Applies a relative occupancy change, flooring at zero. Refused while
    /// the system is off: occupancy is not tracked then.
    pub fn adjust_occupancy(&mut self, delta: i32) -> Result<(u32, u32), CommandError> {
        let Some(current) = self.occupancy else {
            return Err(CommandError::NotTracking);
        };
        let updated = current.saturating_add_signed(delta);
        self.occupancy = Some(updated);
        Ok((current, updated))
    }

    /// Operator override; accepted regardless of power state. A value set
    /// while the system is off survives the next power-on.
    pub fn set_occupancy_absolute(
        &mut self,
        value: i32,
    ) -> Result<(Option<u32>, u32), CommandError> {
        let Ok(value) = u32::try_from(value) else {
            return Err(CommandError::InvalidOccupancy(value));
        };
        let previous = self.occupancy.replace(value);
        Ok((previous, value))
    }

    pub fn set_peer_available(&mut self, available: bool) {
        self.peer_available = available;
    }

    pub fn set_peer_temp(&mut self, value: f32) {
        self.peer_temp = Some(value);
    }

    pub fn clear_peer_temp(&mut self) {
        self.peer_temp = None;
    }

    pub fn set_local_temp(&mut self, value: f32) {
        self.local_temp = Some(value);
    }
}
