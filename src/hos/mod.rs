//! Hours-of-Service bookkeeping for a single driver.
//!
//! [`HosState`] is a plain value: the scheduler creates one per computation
//! and threads it through every step. [`HosClock`] holds the regulatory
//! [`Limits`] and answers the only question the scheduler asks of it: does
//! the driver have to stop right now, and for what?

use crate::shared::time::Duration;

/// Limits of the 70-hour/8-day property-carrying ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Driving allowed before a break is required.
    pub driving_before_break: Duration,
    pub break_duration: Duration,
    /// Driving allowed between two rests.
    pub driving_per_shift: Duration,
    /// Time after coming on duty after which driving stops.
    pub duty_window: Duration,
    pub rest_duration: Duration,
    /// On-duty time allowed in the rolling cycle.
    pub cycle_cap: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            driving_before_break: Duration::from_hours(8),
            break_duration: Duration::from_minutes(30),
            driving_per_shift: Duration::from_hours(11),
            duty_window: Duration::from_hours(14),
            rest_duration: Duration::from_hours(10),
            cycle_cap: Duration::from_hours(70),
        }
    }
}

/// What the clock demands before any more driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopDecision {
    None,
    Break30,
    Rest10h,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HosState {
    pub driving_since_break: Duration,
    pub driving_since_rest: Duration,
    /// Elapsed duty window since the last rest, breaks included.
    pub on_duty_since_rest: Duration,
    /// Never reset: the model has no 34-hour restart and no 8-day roll-off.
    pub cycle_used: Duration,
}

impl HosState {
    pub fn new(cycle_used: Duration) -> Self {
        Self {
            cycle_used,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HosClock {
    limits: Limits,
}

impl HosClock {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// The stop required before driving on. First match wins, and a break
    /// that would run the duty window out is upgraded to a rest.
    pub fn next_mandatory_stop(&self, state: &HosState, remaining_drive: Duration) -> StopDecision {
        if remaining_drive.is_zero() {
            return StopDecision::None;
        }
        if self.cycle_exhausted(state)
            || state.on_duty_since_rest >= self.limits.duty_window
            || state.driving_since_rest >= self.limits.driving_per_shift
        {
            return StopDecision::Rest10h;
        }
        if state.driving_since_break >= self.limits.driving_before_break {
            let window_left = self.limits.duty_window.saturating_sub(state.on_duty_since_rest);
            if window_left <= self.limits.break_duration {
                return StopDecision::Rest10h;
            }
            return StopDecision::Break30;
        }
        StopDecision::None
    }

    pub fn cycle_exhausted(&self, state: &HosState) -> bool {
        state.cycle_used >= self.limits.cycle_cap
    }

    pub fn cycle_remaining(&self, state: &HosState) -> Duration {
        self.limits.cycle_cap.saturating_sub(state.cycle_used)
    }

    /// How long the driver may keep driving before some limit is reached.
    pub fn driving_budget(&self, state: &HosState) -> Duration {
        let limits = &self.limits;
        [
            limits.driving_before_break.saturating_sub(state.driving_since_break),
            limits.driving_per_shift.saturating_sub(state.driving_since_rest),
            limits.duty_window.saturating_sub(state.on_duty_since_rest),
            self.cycle_remaining(state),
        ]
        .into_iter()
        .min()
        .unwrap_or_default()
    }

    /// Whether non-driving work of length `work` fits in the duty window and the cycle.
    pub fn fits_on_duty(&self, state: &HosState, work: Duration) -> bool {
        state.on_duty_since_rest + work <= self.limits.duty_window
            && state.cycle_used + work <= self.limits.cycle_cap
    }

    pub fn advance_driving(&self, state: &mut HosState, driven: Duration) {
        state.driving_since_break += driven;
        state.driving_since_rest += driven;
        state.on_duty_since_rest += driven;
        state.cycle_used += driven;
    }

    pub fn advance_on_duty(&self, state: &mut HosState, worked: Duration) {
        state.on_duty_since_rest += worked;
        state.cycle_used += worked;
    }

    /// Resets what the stop resets. The break's own time keeps running on
    /// the duty window.
    pub fn apply_stop(&self, state: &mut HosState, stop: StopDecision) {
        match stop {
            StopDecision::None => {}
            StopDecision::Break30 => {
                state.driving_since_break = Duration::ZERO;
                state.on_duty_since_rest += self.limits.break_duration;
            }
            StopDecision::Rest10h => {
                state.driving_since_break = Duration::ZERO;
                state.driving_since_rest = Duration::ZERO;
                state.on_duty_since_rest = Duration::ZERO;
            }
        }
    }

    pub fn stop_duration(&self, stop: StopDecision) -> Duration {
        match stop {
            StopDecision::None => Duration::ZERO,
            StopDecision::Break30 => self.limits.break_duration,
            StopDecision::Rest10h => self.limits.rest_duration,
        }
    }
}

#[cfg(test)]
fn hours(h: u32) -> Duration {
    Duration::from_hours(h)
}

#[test]
fn fresh_driver_needs_nothing() {
    let clock = HosClock::default();
    let state = HosState::new(Duration::ZERO);
    assert_eq!(clock.next_mandatory_stop(&state, hours(3)), StopDecision::None);
    assert_eq!(clock.driving_budget(&state), hours(8));
}

#[test]
fn nothing_left_to_drive_needs_nothing() {
    let clock = HosClock::default();
    let mut state = HosState::new(hours(70));
    clock.advance_driving(&mut state, hours(11));
    assert_eq!(clock.next_mandatory_stop(&state, Duration::ZERO), StopDecision::None);
}

#[test]
fn eight_hours_of_driving_needs_a_break() {
    let clock = HosClock::default();
    let mut state = HosState::default();
    clock.advance_driving(&mut state, hours(8));
    assert_eq!(clock.next_mandatory_stop(&state, hours(1)), StopDecision::Break30);
    clock.apply_stop(&mut state, StopDecision::Break30);
    assert_eq!(state.driving_since_break, Duration::ZERO);
    assert_eq!(state.driving_since_rest, hours(8));
    assert_eq!(state.on_duty_since_rest, hours(8) + Duration::from_minutes(30));
    assert_eq!(clock.driving_budget(&state), hours(3));
}

#[test]
fn eleven_hours_of_driving_needs_a_rest() {
    let clock = HosClock::default();
    let mut state = HosState::default();
    clock.advance_driving(&mut state, hours(8));
    clock.apply_stop(&mut state, StopDecision::Break30);
    clock.advance_driving(&mut state, hours(3));
    assert_eq!(clock.next_mandatory_stop(&state, hours(1)), StopDecision::Rest10h);
}

#[test]
fn duty_window_needs_a_rest() {
    let clock = HosClock::default();
    let mut state = HosState::default();
    clock.advance_on_duty(&mut state, hours(10));
    clock.advance_driving(&mut state, hours(4));
    assert_eq!(clock.next_mandatory_stop(&state, hours(1)), StopDecision::Rest10h);
}

#[test]
fn cycle_cap_wins_over_everything() {
    let clock = HosClock::default();
    let mut state = HosState::new(hours(68));
    clock.advance_driving(&mut state, hours(2));
    assert!(clock.cycle_exhausted(&state));
    assert_eq!(clock.next_mandatory_stop(&state, hours(1)), StopDecision::Rest10h);
    clock.apply_stop(&mut state, StopDecision::Rest10h);
    // A rest does not give cycle hours back
    assert_eq!(clock.next_mandatory_stop(&state, hours(1)), StopDecision::Rest10h);
    assert_eq!(clock.driving_budget(&state), Duration::ZERO);
}

#[test]
fn break_at_end_of_window_becomes_a_rest() {
    let clock = HosClock::default();
    let mut state = HosState::default();
    clock.advance_on_duty(&mut state, Duration::from_minutes(5 * 60 + 40));
    clock.advance_driving(&mut state, hours(8));
    // 20 minutes of window left, a 30 minute break would use it all
    assert_eq!(clock.next_mandatory_stop(&state, hours(1)), StopDecision::Rest10h);
}

#[test]
fn rest_resets_shift_counters_only() {
    let clock = HosClock::default();
    let mut state = HosState::new(hours(20));
    clock.advance_driving(&mut state, hours(6));
    clock.apply_stop(&mut state, StopDecision::Rest10h);
    assert_eq!(
        state,
        HosState {
            cycle_used: hours(26),
            ..Default::default()
        }
    );
}

#[test]
fn fits_on_duty_checks_window_and_cycle() {
    let clock = HosClock::default();
    let mut state = HosState::new(hours(40));
    clock.advance_on_duty(&mut state, Duration::from_minutes(13 * 60 + 30));
    assert!(clock.fits_on_duty(&state, Duration::from_minutes(30)));
    assert!(!clock.fits_on_duty(&state, Duration::from_minutes(31)));
    let state = HosState::new(Duration::from_minutes(69 * 60 + 45));
    assert!(!clock.fits_on_duty(&state, Duration::from_minutes(30)));
}

#[test]
fn budget_is_the_tightest_limit() {
    let clock = HosClock::default();
    let mut state = HosState::new(Duration::from_minutes(69 * 60));
    assert_eq!(clock.driving_budget(&state), hours(1));
    state.cycle_used = Duration::ZERO;
    clock.advance_on_duty(&mut state, Duration::from_minutes(12 * 60));
    assert_eq!(clock.driving_budget(&state), hours(2));
}
