use crate::types::Power;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Reoccupied,
    PoweredOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Armed { deadline_ms: u64 },
    Cancelled(CancelReason),
    Expired,
}

/// Single-shot vacancy timer. At most one instance is live at a time; it is
/// evaluated once per control tick rather than on every inbound event, which
/// keeps the occupancy/power ordering race-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VacancyTimer {
    Idle,
    Armed { deadline_ms: u64 },
}

impl VacancyTimer {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        match self {
            Self::Armed { deadline_ms } => Some(deadline_ms.saturating_sub(now_ms)),
            Self::Idle => None,
        }
    }

    /// Runs one round of transitions in the fixed order: arm, reoccupy
    /// cancel, expiry, off cancel. Expiry only reports the event; the caller
    /// owns the power-off side effect.
    pub fn evaluate(
        &mut self,
        power: Power,
        occupancy: Option<u32>,
        now_ms: u64,
        timeout_ms: u64,
    ) -> Option<TimerEvent> {
        match *self {
            Self::Idle => {
                if power == Power::On && occupancy == Some(0) {
                    let deadline_ms = now_ms + timeout_ms;
                    *self = Self::Armed { deadline_ms };
                    return Some(TimerEvent::Armed { deadline_ms });
                }
                None
            }
            Self::Armed { deadline_ms } => {
                if occupancy.is_some_and(|count| count > 0) {
                    *self = Self::Idle;
                    return Some(TimerEvent::Cancelled(CancelReason::Reoccupied));
                }
                if power == Power::On && now_ms >= deadline_ms {
                    *self = Self::Idle;
                    return Some(TimerEvent::Expired);
                }
                if power == Power::Off {
                    *self = Self::Idle;
                    return Some(TimerEvent::Cancelled(CancelReason::PoweredOff));
                }
                None
            }
        }
    }
}

impl Default for VacancyTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TIMEOUT: u64 = 300_000;

    #[test]
    fn arms_when_on_and_vacant() {
        let mut timer = VacancyTimer::new();
        let event = timer.evaluate(Power::On, Some(0), 1_000, TIMEOUT);

        assert_eq!(event, Some(TimerEvent::Armed { deadline_ms: 301_000 }));
        assert_eq!(timer.remaining_ms(2_000), Some(299_000));
    }

    #[test]
    fn does_not_arm_while_off_or_occupied() {
        let mut timer = VacancyTimer::new();
        assert_eq!(timer.evaluate(Power::Off, None, 0, TIMEOUT), None);
        assert_eq!(timer.evaluate(Power::On, Some(2), 0, TIMEOUT), None);
        assert!(!timer.is_armed());
    }

    #[test]
    fn does_not_rearm_while_armed() {
        let mut timer = VacancyTimer::new();
        timer.evaluate(Power::On, Some(0), 0, TIMEOUT);
        assert_eq!(timer.evaluate(Power::On, Some(0), 1_000, TIMEOUT), None);
        assert_eq!(timer.remaining_ms(0), Some(TIMEOUT));
    }

    #[test]
    fn reoccupation_cancels() {
        let mut timer = VacancyTimer::new();
        timer.evaluate(Power::On, Some(0), 0, TIMEOUT);

        let event = timer.evaluate(Power::On, Some(1), 1_000, TIMEOUT);
        assert_eq!(event, Some(TimerEvent::Cancelled(CancelReason::Reoccupied)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn manual_off_cancels() {
        let mut timer = VacancyTimer::new();
        timer.evaluate(Power::On, Some(0), 0, TIMEOUT);

        let event = timer.evaluate(Power::Off, None, 1_000, TIMEOUT);
        assert_eq!(event, Some(TimerEvent::Cancelled(CancelReason::PoweredOff)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn expires_exactly_once() {
        let mut timer = VacancyTimer::new();
        timer.evaluate(Power::On, Some(0), 0, TIMEOUT);

        assert_eq!(timer.evaluate(Power::On, Some(0), TIMEOUT - 1, TIMEOUT), None);
        assert_eq!(
            timer.evaluate(Power::On, Some(0), TIMEOUT, TIMEOUT),
            Some(TimerEvent::Expired)
        );
        assert!(!timer.is_armed());
    }

    #[test]
    fn reoccupation_wins_over_expiry() {
        let mut timer = VacancyTimer::new();
        timer.evaluate(Power::On, Some(0), 0, TIMEOUT);

        // Both conditions hold on the same tick; the cancel check runs first.
        let event = timer.evaluate(Power::On, Some(1), TIMEOUT + 1, TIMEOUT);
        assert_eq!(event, Some(TimerEvent::Cancelled(CancelReason::Reoccupied)));
    }
}
