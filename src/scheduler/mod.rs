pub mod timeline;
mod state;

pub use timeline::*;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::{
    hos::{HosClock, HosState, Limits},
    route::{Route, RouteLeg},
    scheduler::state::{FUEL_SLACK, State},
    shared::{
        geo::Distance,
        time::{Duration, Time},
    },
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Current cycle must be between 0 and {max} hours, got {given}")]
    InvalidCycle { given: f64, max: f64 },
    #[error("Route leg {leg} is unusable: {reason}")]
    InvalidRoute { leg: usize, reason: String },
    #[error("Scheduler settings are unusable: {0}")]
    InvalidSettings(String),
    #[error(
        "Trip would bring the cycle to {needed:.1} hours, over the {available:.1} hour limit; a cycle restart is required first"
    )]
    ComplianceUnreachable { needed: f64, available: f64 },
    #[error("Scheduler invariant violated: {0}")]
    Invariant(String),
}

/// Fixed durations and intervals of the stops the scheduler inserts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Loading time at the pickup.
    pub pickup_duration: Duration,
    /// Unloading time at the destination.
    pub dropoff_duration: Duration,
    pub fuel_interval: Distance,
    pub fuel_duration: Duration,
    /// Longest stretch driven between two looks at the clock.
    pub max_increment: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pickup_duration: Duration::from_hours(1),
            dropoff_duration: Duration::from_hours(1),
            fuel_interval: Distance::from_miles(1_000.0),
            fuel_duration: Duration::from_minutes(30),
            max_increment: Duration::from_hours(1),
        }
    }
}

/// Greedy single pass over the two legs of a trip that lays out a
/// compliant timeline of driving, stops and shifts.
///
/// ```ignore
/// let timeline = Scheduler::new(&to_pickup, &to_destination, departure)
///     .cycle_hours(12.5)
///     .labels("Chicago, IL", "Denver, CO", "Los Angeles, CA")
///     .solve()?;
/// ```
pub struct Scheduler<'a> {
    legs: [&'a RouteLeg; 2],
    departure: Time,
    cycle_hours: f64,
    settings: Settings,
    clock: HosClock,
    /// Origin, pickup and destination.
    labels: [Option<Arc<str>>; 3],
}

impl<'a> Scheduler<'a> {
    pub fn new(to_pickup: &'a RouteLeg, to_destination: &'a RouteLeg, departure: Time) -> Self {
        Self {
            legs: [to_pickup, to_destination],
            departure,
            cycle_hours: 0.0,
            settings: Settings::default(),
            clock: HosClock::default(),
            labels: Default::default(),
        }
    }

    pub fn for_route(route: &'a Route, departure: Time) -> Self {
        Self::new(&route.to_pickup, &route.to_destination, departure)
    }

    /// Hours already used in the current cycle before departure.
    pub fn cycle_hours(mut self, hours: f64) -> Self {
        self.cycle_hours = hours;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.clock = HosClock::new(limits);
        self
    }

    pub fn labels(
        mut self,
        origin: impl Into<Arc<str>>,
        pickup: impl Into<Arc<str>>,
        destination: impl Into<Arc<str>>,
    ) -> Self {
        self.labels = [
            Some(origin.into()),
            Some(pickup.into()),
            Some(destination.into()),
        ];
        self
    }

    pub fn solve(&self) -> Result<Timeline, self::Error> {
        let hos = HosState::new(self.initial_cycle()?);
        self.check_inputs()?;
        self.check_cycle(&hos)?;

        let mut state = State::new(&self.clock, &self.settings, self.departure, hos);
        let mut remaining: Duration = self.legs.iter().map(|leg| leg.duration).sum();
        let waypoints = [
            (Reason::PickupPoint, self.settings.pickup_duration),
            (Reason::DropoffPoint, self.settings.dropoff_duration),
        ];

        for (i, leg) in self.legs.iter().enumerate() {
            let mut elapsed = Duration::ZERO;
            while elapsed < leg.duration {
                state.settle(leg.position_after(elapsed), remaining)?;

                let step = [
                    self.settings.max_increment,
                    leg.duration - elapsed,
                    self.clock.driving_budget(&state.hos),
                    self.time_to_fuel(leg, elapsed, state.since_fuel),
                ]
                .into_iter()
                .min()
                .unwrap_or_default();
                if step.is_zero() {
                    return Err(self::Error::Invariant(format!(
                        "no driving possible {elapsed} into leg {i} after settling"
                    )));
                }

                let label = elapsed.is_zero().then(|| self.labels[i].clone()).flatten();
                state.drive(leg, elapsed, step, label);
                elapsed += step;
                remaining -= step;
            }

            // Waypoints take precedence, anything due here is settled right after
            let (reason, duration) = waypoints[i];
            state.perform_service(reason, leg.end, self.labels[i + 1].clone(), duration)?;
        }

        let timeline = state.finish();
        timeline
            .audit(self.clock.limits())
            .map_err(self::Error::Invariant)?;
        debug!(
            "Scheduled {} entries over {} shifts, arriving {:?}",
            timeline.stops().len(),
            timeline.shifts(),
            timeline.arrival()
        );
        Ok(timeline)
    }

    fn initial_cycle(&self) -> Result<Duration, self::Error> {
        let max = self.clock.limits().cycle_cap.as_hours();
        if !self.cycle_hours.is_finite() || self.cycle_hours < 0.0 || self.cycle_hours > max {
            return Err(self::Error::InvalidCycle {
                given: self.cycle_hours,
                max,
            });
        }
        Ok(Duration::from_hours_f64(self.cycle_hours))
    }

    fn check_inputs(&self) -> Result<(), self::Error> {
        for (leg, route) in self.legs.iter().enumerate() {
            route
                .check()
                .map_err(|reason| self::Error::InvalidRoute { leg, reason })?;
        }
        let settings = &self.settings;
        if settings.fuel_interval <= Distance::ZERO || !settings.fuel_interval.is_finite() {
            return Err(self::Error::InvalidSettings(
                "fuel interval must be a positive distance".into(),
            ));
        }
        if settings.max_increment.is_zero() {
            return Err(self::Error::InvalidSettings(
                "driving increment must be positive".into(),
            ));
        }
        let limits = self.clock.limits();
        if limits.driving_before_break.is_zero()
            || limits.driving_per_shift.is_zero()
            || limits.duty_window.is_zero()
        {
            return Err(self::Error::InvalidSettings(
                "driving limits must be positive".into(),
            ));
        }
        let longest_service = settings
            .pickup_duration
            .max(settings.dropoff_duration)
            .max(settings.fuel_duration);
        if longest_service > limits.duty_window {
            return Err(self::Error::InvalidSettings(format!(
                "a stop of {longest_service} does not fit in a duty window"
            )));
        }
        Ok(())
    }

    /// Cycle time never comes back within one trip, so all of the trip's
    /// on-duty time has to fit in what is left before departure.
    fn check_cycle(&self, hos: &HosState) -> Result<(), self::Error> {
        let distance: Distance = self.legs.iter().map(|leg| leg.distance).sum();
        let fuel_stops = if distance > FUEL_SLACK {
            ((distance - FUEL_SLACK) / self.settings.fuel_interval).floor() as u32
        } else {
            0
        };
        let driving: Duration = self.legs.iter().map(|leg| leg.duration).sum();
        let needed = driving
            + self.settings.pickup_duration
            + self.settings.dropoff_duration
            + Duration::from_seconds(self.settings.fuel_duration.as_seconds() * fuel_stops);
        if needed > self.clock.cycle_remaining(hos) {
            return Err(self::Error::ComplianceUnreachable {
                needed: (hos.cycle_used + needed).as_hours(),
                available: self.clock.limits().cycle_cap.as_hours(),
            });
        }
        Ok(())
    }

    /// Driving time until the next fuel stop falls due on this leg.
    fn time_to_fuel(&self, leg: &RouteLeg, elapsed: Duration, since_fuel: Distance) -> Duration {
        let left = (self.settings.fuel_interval - since_fuel).max(Distance::ZERO);
        let target = leg.time_to_cover(leg.distance_after(elapsed) + left);
        target.saturating_sub(elapsed).max(Duration::from_seconds(1))
    }
}
