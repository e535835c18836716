use chrono::Local;

use crate::{
    config::ControlConfig,
    error::CommandError,
    event::{EventKind, Notice},
    state::{PowerTransition, SystemState},
    timeout::{CancelReason, TimerEvent, VacancyTimer},
    types::{Mode, Power, StatusSnapshot},
};

/// A command for the downstream actuator (or the peer's sensor front-end).
/// `Delay` entries enforce the minimum spacing between dependent commands;
/// the transport executes actions strictly in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineAction {
    Power(Power),
    SetMode(Mode),
    SetTarget(i32),
    RequestPeerTemp,
    Delay(u64),
}

/// What one engine operation wants the outside world to do: actuator
/// commands to emit, events to record, and optionally a status snapshot to
/// deliver back to the requester.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub actions: Vec<EngineAction>,
    pub notices: Vec<Notice>,
    pub snapshot: Option<StatusSnapshot>,
}

impl Outcome {
    pub fn rejection(err: &CommandError) -> Self {
        Self {
            notices: vec![Notice::new(EventKind::InvalidInput, err.to_string())],
            ..Self::default()
        }
    }

    fn notice(&mut self, kind: EventKind, detail: impl Into<String>) {
        self.notices.push(Notice::new(kind, detail));
    }
}

/// The control state machine: owns the system state and the vacancy timer,
/// and turns inbound events and clock ticks into actuator commands. Pure
/// in-memory logic; all timing comes in as monotonic milliseconds so tests
/// drive the clock.
#[derive(Debug, Clone)]
pub struct ControlEngine {
    config: ControlConfig,
    state: SystemState,
    timer: VacancyTimer,
}

impl ControlEngine {
    pub fn new(mut config: ControlConfig) -> Self {
        config.sanitize();
        let state = SystemState::new(config.initial_target_temp);
        Self {
            config,
            state,
            timer: VacancyTimer::new(),
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn timer(&self) -> &VacancyTimer {
        &self.timer
    }

    /// Operator power command. The actuator command is always forwarded;
    /// the mode/target follow-up sequence fires only on an actual Off->On
    /// edge, never on a repeat.
    pub fn handle_power(&mut self, power: Power) -> Outcome {
        let mut out = Outcome::default();
        out.actions.push(EngineAction::Power(power));

        match self.state.set_power(power) {
            PowerTransition::TurnedOn => {
                out.actions.push(EngineAction::Delay(self.config.command_gap_ms));
                out.actions.push(EngineAction::SetMode(Mode::Super));
                out.actions.push(EngineAction::Delay(self.config.command_gap_ms));
                out.actions
                    .push(EngineAction::SetTarget(self.state.target_temp()));
                out.notice(
                    EventKind::PowerChanged,
                    format!(
                        "system powered on; mode set to super, target {} degrees",
                        self.state.target_temp()
                    ),
                );
            }
            PowerTransition::TurnedOff => {
                out.notice(EventKind::PowerChanged, "system powered off");
            }
            PowerTransition::Unchanged => {}
        }
        out
    }

    pub fn handle_mode(&mut self, mode: Mode) -> Result<Outcome, CommandError> {
        if self.state.power() == Power::Off {
            return Err(CommandError::InvalidMode);
        }

        let mut out = Outcome::default();
        out.actions.push(EngineAction::SetMode(mode));
        if self.state.set_mode(mode)? {
            out.notice(EventKind::ModeChanged, format!("mode set to {}", mode.as_str()));
        }
        Ok(out)
    }

    pub fn handle_target(&mut self, temp: i32) -> Result<Outcome, CommandError> {
        let mut out = Outcome::default();
        let changed = self.state.set_target_temp(temp)?;
        out.actions.push(EngineAction::SetTarget(temp));
        if changed {
            out.notice(
                EventKind::TargetChanged,
                format!("target temperature set to {temp} degrees"),
            );
        }
        Ok(out)
    }

    /// Relative occupancy change reported by the peer. The router drops
    /// these entirely while the system is off; here the system is known on.
    pub fn handle_occupancy_delta(&mut self, delta: i32) -> Result<Outcome, CommandError> {
        let (previous, updated) = self.state.adjust_occupancy(delta)?;
        let mut out = Outcome::default();
        out.notice(
            EventKind::OccupancyChanged,
            format!("occupancy change registered; updated from {previous} to {updated}"),
        );
        Ok(out)
    }

    pub fn handle_occupancy_override(&mut self, value: i32) -> Result<Outcome, CommandError> {
        let (previous, updated) = self.state.set_occupancy_absolute(value)?;
        let mut out = Outcome::default();
        let previous = previous.map_or_else(|| "untracked".to_string(), |n| n.to_string());
        out.notice(
            EventKind::OccupancyChanged,
            format!("occupancy override; updated from {previous} to {updated}"),
        );
        Ok(out)
    }

    /// The peer answered the outstanding temperature poll with a good
    /// reading.
    pub fn peer_temperature(&mut self, value: f32) -> Outcome {
        self.state.set_peer_available(true);
        self.state.set_peer_temp(value);
        let mut out = Outcome::default();
        out.notice(
            EventKind::PeerTemperature,
            format!("temperature of {value:.1} received from peer"),
        );
        out
    }

    /// The peer answered the poll but the payload did not parse. It still
    /// counts as a response for liveness purposes.
    pub fn peer_responded(&mut self) {
        self.state.set_peer_available(true);
    }

    pub fn local_temperature(&mut self, value: f32) -> Outcome {
        self.state.set_local_temp(value);
        let mut out = Outcome::default();
        out.notice(
            EventKind::LocalTemperature,
            format!("local temperature recorded: {value:.1}"),
        );
        out
    }

    /// Starts one slow poll period: settles the previous period's liveness
    /// verdict, then asks the peer for a fresh reading. The caller follows
    /// up with the local sensor read.
    pub fn begin_poll(&mut self) -> Outcome {
        let mut out = Outcome::default();
        if !self.state.peer_available() {
            self.state.clear_peer_temp();
            out.notice(
                EventKind::PeerUnresponsive,
                "peer did not respond to last temperature request",
            );
        }
        self.state.set_peer_available(false);
        out.actions.push(EngineAction::RequestPeerTemp);
        out
    }

    /// One fast control tick: the occupancy-driven quiet-mode rule, then the
    /// vacancy-timer transitions. Order matters; the timer sees any mode
    /// mutation made earlier in the same tick.
    pub fn tick(&mut self, now_ms: u64) -> Outcome {
        let mut out = Outcome::default();

        if self.state.power() == Power::On
            && self.state.occupancy().is_some_and(|count| count > 0)
            && self.state.mode() != Some(Mode::Quiet)
        {
            out.actions.push(EngineAction::SetMode(Mode::Quiet));
            if self.state.set_mode(Mode::Quiet).unwrap_or(false) {
                out.notice(EventKind::ModeChanged, "room occupied; mode set to quiet");
            }
        }

        let event = self.timer.evaluate(
            self.state.power(),
            self.state.occupancy(),
            now_ms,
            self.config.timeout_ms(),
        );
        match event {
            Some(TimerEvent::Armed { .. }) => {
                out.notice(
                    EventKind::TimerArmed,
                    format!(
                        "room unoccupied; system will turn off in {} min unless reoccupied",
                        self.config.timeout_minutes
                    ),
                );
            }
            Some(TimerEvent::Cancelled(CancelReason::Reoccupied)) => {
                out.notice(EventKind::TimerCancelled, "room reoccupied; timeout cancelled");
            }
            Some(TimerEvent::Cancelled(CancelReason::PoweredOff)) => {
                out.notice(EventKind::TimerCancelled, "system turned off; timeout cancelled");
            }
            Some(TimerEvent::Expired) => {
                out.actions.push(EngineAction::Power(Power::Off));
                self.state.set_power(Power::Off);
                out.notice(EventKind::TimerExpired, "timeout expired; system turned off");
            }
            None => {}
        }

        out
    }

    pub fn status(&self, now_ms: u64) -> StatusSnapshot {
        StatusSnapshot {
            power: self.state.power().as_str(),
            mode: self.state.mode().map(Mode::as_str),
            target_temp: self.state.target_temp(),
            occupancy: self.state.occupancy(),
            peer_available: self.state.peer_available(),
            local_temp: self.state.local_temp(),
            peer_temp: self.state.peer_temp(),
            timer_deadline: self.timer_deadline_string(now_ms),
        }
    }

    fn timer_deadline_string(&self, now_ms: u64) -> String {
        match self.timer.remaining_ms(now_ms) {
            Some(remaining_ms) => {
                let deadline = Local::now() + chrono::Duration::milliseconds(remaining_ms as i64);
                deadline.format("%H:%M").to_string()
            }
            None => "N/A".to_string(),
        }
    }
}
