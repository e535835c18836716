use crate::{
    engine::{ControlEngine, Outcome},
    error::CommandError,
    event::{EventKind, Notice},
    topics,
    types::{Mode, Power},
};

/// An inbound event, classified by topic. Payloads stay raw here; the
/// router owns parsing and domain validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    PeerTemperature(&'a str),
    PeerOccupancyDelta(&'a str),
    PeerLog(&'a str),
    UserPower(&'a str),
    UserMode(&'a str),
    UserTarget(&'a str),
    UserOccupancy(&'a str),
    Refresh,
}

impl<'a> Inbound<'a> {
    pub fn from_topic(topic: &str, payload: &'a str) -> Option<Self> {
        match topic {
            topics::TOPIC_PEER_TEMP => Some(Self::PeerTemperature(payload)),
            topics::TOPIC_PEER_OCC_CHANGE => Some(Self::PeerOccupancyDelta(payload)),
            topics::TOPIC_PEER_LOG => Some(Self::PeerLog(payload)),
            topics::TOPIC_USER_POWER => Some(Self::UserPower(payload)),
            topics::TOPIC_USER_MODE => Some(Self::UserMode(payload)),
            topics::TOPIC_USER_TARGET => Some(Self::UserTarget(payload)),
            topics::TOPIC_USER_OCCUPANCY => Some(Self::UserOccupancy(payload)),
            topics::TOPIC_USER_REFRESH => Some(Self::Refresh),
            _ => None,
        }
    }
}

/// Validates one inbound event and applies it to the engine. Rejected input
/// is converted into a diagnostic notice, never an error: the router must
/// stay live for whatever arrives next.
pub fn dispatch(engine: &mut ControlEngine, inbound: Inbound<'_>, now_ms: u64) -> Outcome {
    match inbound {
        Inbound::PeerTemperature(payload) => match payload.trim().parse::<f32>() {
            Ok(value) if value.is_finite() => engine.peer_temperature(value),
            _ => {
                // The peer responded, even if its payload was bad.
                engine.peer_responded();
                Outcome::rejection(&CommandError::MalformedPayload {
                    field: "peer temperature",
                    payload: payload.to_string(),
                })
            }
        },
        Inbound::PeerOccupancyDelta(payload) => {
            if engine.state().power() == Power::Off {
                // Occupancy is irrelevant while the system is off; not even
                // worth a diagnostic.
                return Outcome::default();
            }
            match payload.trim().parse::<i32>() {
                Ok(delta) => engine
                    .handle_occupancy_delta(delta)
                    .unwrap_or_else(|err| Outcome::rejection(&err)),
                Err(_) => Outcome::rejection(&CommandError::MalformedPayload {
                    field: "peer occupancy change",
                    payload: payload.to_string(),
                }),
            }
        }
        Inbound::PeerLog(payload) => Outcome {
            notices: vec![Notice::new(EventKind::PeerLog, payload)],
            ..Outcome::default()
        },
        Inbound::UserPower(payload) => match Power::parse(payload) {
            Some(power) => engine.handle_power(power),
            None => Outcome::rejection(&CommandError::InvalidCommand {
                field: "power",
                value: payload.to_string(),
            }),
        },
        Inbound::UserMode(payload) => match Mode::parse(payload) {
            Some(mode) => engine
                .handle_mode(mode)
                .unwrap_or_else(|err| Outcome::rejection(&err)),
            None => Outcome::rejection(&CommandError::InvalidCommand {
                field: "mode",
                value: payload.to_string(),
            }),
        },
        Inbound::UserTarget(payload) => match payload.trim().parse::<i32>() {
            Ok(temp) => engine
                .handle_target(temp)
                .unwrap_or_else(|err| Outcome::rejection(&err)),
            Err(_) => Outcome::rejection(&CommandError::MalformedPayload {
                field: "target temperature",
                payload: payload.to_string(),
            }),
        },
        Inbound::UserOccupancy(payload) => match payload.trim().parse::<i32>() {
            Ok(value) => engine
                .handle_occupancy_override(value)
                .unwrap_or_else(|err| Outcome::rejection(&err)),
            Err(_) => Outcome::rejection(&CommandError::MalformedPayload {
                field: "occupancy override",
                payload: payload.to_string(),
            }),
        },
        Inbound::Refresh => {
            let mut out = Outcome::default();
            out.snapshot = Some(engine.status(now_ms));
            out.notices.push(Notice::new(
                EventKind::Refresh,
                "refresh request from user client; sent all parameters",
            ));
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        config::ControlConfig,
        engine::EngineAction,
        types::{Mode, Power},
    };

    use super::*;

    fn engine() -> ControlEngine {
        ControlEngine::new(ControlConfig::default())
    }

    fn powered_on() -> ControlEngine {
        let mut engine = engine();
        dispatch(&mut engine, Inbound::UserPower("on"), 0);
        engine
    }

    fn rejection_kinds(out: &Outcome) -> Vec<EventKind> {
        out.notices.iter().map(|notice| notice.kind).collect()
    }

    #[test]
    fn classifies_every_known_topic() {
        assert_eq!(
            Inbound::from_topic(topics::TOPIC_USER_POWER, "on"),
            Some(Inbound::UserPower("on"))
        );
        assert_eq!(
            Inbound::from_topic(topics::TOPIC_PEER_TEMP, "21.5"),
            Some(Inbound::PeerTemperature("21.5"))
        );
        assert_eq!(
            Inbound::from_topic(topics::TOPIC_USER_REFRESH, ""),
            Some(Inbound::Refresh)
        );
        assert_eq!(Inbound::from_topic("smartac/unknown", "x"), None);
    }

    #[test]
    fn power_literal_must_match_exactly() {
        let mut engine = engine();
        let out = dispatch(&mut engine, Inbound::UserPower("ON"), 0);

        assert!(out.actions.is_empty());
        assert_eq!(rejection_kinds(&out), vec![EventKind::InvalidInput]);
        assert_eq!(engine.state().power(), Power::Off);
    }

    #[test]
    fn valid_power_command_runs_startup_sequence() {
        let mut engine = engine();
        let out = dispatch(&mut engine, Inbound::UserPower("on"), 0);

        assert_eq!(out.actions.first(), Some(&EngineAction::Power(Power::On)));
        assert_eq!(out.actions.len(), 5);
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        let mut engine = powered_on();
        let out = dispatch(&mut engine, Inbound::UserTarget("30"), 0);

        assert!(out.actions.is_empty());
        assert_eq!(rejection_kinds(&out), vec![EventKind::InvalidInput]);
        assert!(out.notices[0].detail.contains("30"));
        assert_eq!(engine.state().target_temp(), 16);
    }

    #[test]
    fn unparseable_temperature_rejected() {
        let mut engine = powered_on();
        let out = dispatch(&mut engine, Inbound::UserTarget("warm"), 0);

        assert!(out.actions.is_empty());
        assert!(out.notices[0].detail.contains("warm"));
        assert_eq!(engine.state().target_temp(), 16);
    }

    #[test]
    fn mode_command_rejected_while_off() {
        let mut engine = engine();
        let out = dispatch(&mut engine, Inbound::UserMode("quiet"), 0);

        assert!(out.actions.is_empty());
        assert_eq!(rejection_kinds(&out), vec![EventKind::InvalidInput]);
    }

    #[test]
    fn unknown_mode_rejected() {
        let mut engine = powered_on();
        let out = dispatch(&mut engine, Inbound::UserMode("turbo"), 0);

        assert!(out.actions.is_empty());
        assert!(out.notices[0].detail.contains("turbo"));
        assert_eq!(engine.state().mode(), Some(Mode::Super));
    }

    #[test]
    fn valid_mode_command_forwards_then_mutates() {
        let mut engine = powered_on();
        let out = dispatch(&mut engine, Inbound::UserMode("cooling"), 0);

        assert_eq!(out.actions, vec![EngineAction::SetMode(Mode::Cooling)]);
        assert_eq!(engine.state().mode(), Some(Mode::Cooling));
    }

    #[test]
    fn peer_occupancy_ignored_while_off() {
        let mut engine = engine();
        let out = dispatch(&mut engine, Inbound::PeerOccupancyDelta("1"), 0);

        assert_eq!(out, Outcome::default());
        assert_eq!(engine.state().occupancy(), None);
    }

    #[test]
    fn peer_occupancy_applied_while_on() {
        let mut engine = powered_on();
        dispatch(&mut engine, Inbound::PeerOccupancyDelta("2"), 0);
        assert_eq!(engine.state().occupancy(), Some(2));

        dispatch(&mut engine, Inbound::PeerOccupancyDelta("-5"), 0);
        assert_eq!(engine.state().occupancy(), Some(0));
    }

    #[test]
    fn malformed_peer_temperature_still_marks_peer_available() {
        let mut engine = engine();
        engine.begin_poll();

        let out = dispatch(&mut engine, Inbound::PeerTemperature("toasty"), 0);
        assert_eq!(rejection_kinds(&out), vec![EventKind::InvalidInput]);
        assert!(engine.state().peer_available());
        assert_eq!(engine.state().peer_temp(), None);
    }

    #[test]
    fn peer_temperature_updates_reading() {
        let mut engine = engine();
        let out = dispatch(&mut engine, Inbound::PeerTemperature("21.5"), 0);

        assert_eq!(out.notices[0].kind, EventKind::PeerTemperature);
        assert_eq!(engine.state().peer_temp(), Some(21.5));
    }

    #[test]
    fn negative_occupancy_override_rejected() {
        let mut engine = powered_on();
        let out = dispatch(&mut engine, Inbound::UserOccupancy("-3"), 0);

        assert_eq!(rejection_kinds(&out), vec![EventKind::InvalidInput]);
        assert_eq!(engine.state().occupancy(), Some(0));
    }

    #[test]
    fn refresh_returns_snapshot_without_mutation() {
        let mut engine = powered_on();
        let out = dispatch(&mut engine, Inbound::Refresh, 0);

        let snapshot = out.snapshot.expect("refresh must produce a snapshot");
        assert_eq!(snapshot.power, "on");
        assert_eq!(snapshot.occupancy, Some(0));
        assert_eq!(snapshot.timer_deadline, "N/A");
        assert!(out.actions.is_empty());
    }

    #[test]
    fn peer_log_is_relayed_as_notice() {
        let mut engine = engine();
        let out = dispatch(&mut engine, Inbound::PeerLog("ir command executed"), 0);

        assert_eq!(
            out.notices,
            vec![Notice::new(EventKind::PeerLog, "ir command executed")]
        );
    }
}
