use std::sync::Arc;

use tracing::debug;

use crate::{
    hos::{HosClock, HosState, StopDecision},
    route::RouteLeg,
    scheduler::{
        Error, Settings,
        timeline::{DutyStatus, Reason, Stop, Timeline},
    },
    shared::{
        geo::{Coordinate, Distance},
        time::{Duration, Time},
    },
};

/// Float slack when comparing driven distance against the fuel interval.
pub(crate) const FUEL_SLACK: Distance = Distance::from_meters(1.0);

/// A break, a rest, a fuel stop and another rest is the most one position
/// ever needs, plus the final check.
const MAX_STOPS_PER_POSITION: usize = 5;

/// Driving that has not been interrupted by a stop yet.
#[derive(Debug, Clone)]
struct OpenDrive {
    start: Time,
    location: Coordinate,
    address: Option<Arc<str>>,
    duration: Duration,
    distance: Distance,
}

/// Mutable working state of one scheduling pass.
pub(crate) struct State<'a> {
    clock: &'a HosClock,
    settings: &'a Settings,
    pub hos: HosState,
    pub now: Time,
    pub shift: u32,
    pub since_fuel: Distance,
    stops: Vec<Stop>,
    drive: Option<OpenDrive>,
}

impl<'a> State<'a> {
    pub fn new(clock: &'a HosClock, settings: &'a Settings, departure: Time, hos: HosState) -> Self {
        Self {
            clock,
            settings,
            hos,
            now: departure,
            shift: 1,
            since_fuel: Distance::ZERO,
            stops: Vec::with_capacity(32),
            drive: None,
        }
    }

    /// Drives `step` of `leg`, starting `elapsed` into it.
    pub fn drive(&mut self, leg: &RouteLeg, elapsed: Duration, step: Duration, label: Option<Arc<str>>) {
        let distance = leg.distance_after(elapsed + step) - leg.distance_after(elapsed);
        if self.drive.is_none() {
            let location = leg.position_after(elapsed);
            // Driving picks up where the last stop left off
            let address = label.or_else(|| {
                self.stops
                    .last()
                    .filter(|stop| stop.location == location)
                    .and_then(|stop| stop.address.clone())
            });
            self.drive = Some(OpenDrive {
                start: self.now,
                location,
                address,
                duration: Duration::ZERO,
                distance: Distance::ZERO,
            });
        }
        if let Some(drive) = self.drive.as_mut() {
            drive.duration += step;
            drive.distance += distance;
        }
        self.now += step;
        self.since_fuel += distance;
        self.clock.advance_driving(&mut self.hos, step);
    }

    fn close_drive(&mut self) {
        if let Some(drive) = self.drive.take() {
            self.stops.push(Stop {
                status: DutyStatus::Driving,
                reason: Reason::None,
                location: drive.location,
                address: drive.address,
                start: drive.start,
                end: self.now,
                duration: drive.duration,
                shift: self.shift,
                distance: drive.distance,
                cycle_used: self.hos.cycle_used,
            });
        }
    }

    /// Records a stop that has already been applied to the clock, so the
    /// entry carries the state at its end. The open drive must be closed
    /// before the clock moves.
    fn push_stop(
        &mut self,
        status: DutyStatus,
        reason: Reason,
        location: Coordinate,
        address: Option<Arc<str>>,
        duration: Duration,
    ) {
        let start = self.now;
        self.now += duration;
        self.stops.push(Stop {
            status,
            reason,
            location,
            address,
            start,
            end: self.now,
            duration,
            shift: self.shift,
            distance: Distance::ZERO,
            cycle_used: self.hos.cycle_used,
        });
    }

    /// Takes the break or rest the clock asked for.
    fn take_hos_stop(&mut self, decision: StopDecision, location: Coordinate) -> Result<(), Error> {
        let (status, reason) = match decision {
            StopDecision::None => return Ok(()),
            StopDecision::Break30 => (DutyStatus::OffDuty, Reason::Break30),
            StopDecision::Rest10h => {
                if self.clock.cycle_exhausted(&self.hos) {
                    return Err(self.cycle_error(Duration::ZERO));
                }
                (DutyStatus::SleeperBerth, Reason::Rest10h)
            }
        };
        debug!(
            "{reason} at {location} after {} driving, shift {}",
            self.hos.driving_since_rest, self.shift
        );
        let duration = self.clock.stop_duration(decision);
        self.close_drive();
        self.clock.apply_stop(&mut self.hos, decision);
        self.push_stop(status, reason, location, None, duration);
        if decision == StopDecision::Rest10h {
            self.shift += 1;
        }
        Ok(())
    }

    /// On-duty work that is not driving: cargo handling and fueling. Work
    /// that would overrun the duty window waits for a rest.
    pub fn perform_service(
        &mut self,
        reason: Reason,
        location: Coordinate,
        address: Option<Arc<str>>,
        duration: Duration,
    ) -> Result<(), Error> {
        if self.clock.cycle_remaining(&self.hos) < duration {
            return Err(self.cycle_error(duration));
        }
        if !self.clock.fits_on_duty(&self.hos, duration) {
            self.take_hos_stop(StopDecision::Rest10h, location)?;
            if !self.clock.fits_on_duty(&self.hos, duration) {
                return Err(Error::Invariant(format!(
                    "{reason} of {duration} does not fit in an empty duty window"
                )));
            }
        }
        debug!("{reason} at {location} for {duration}");
        self.close_drive();
        self.clock.advance_on_duty(&mut self.hos, duration);
        self.push_stop(DutyStatus::OnDuty, reason, location, address, duration);
        Ok(())
    }

    /// Takes every stop that is due at `location` before driving on.
    /// HOS stops come first, a due fuel stop waits behind them.
    pub fn settle(&mut self, location: Coordinate, remaining_drive: Duration) -> Result<(), Error> {
        for _ in 0..MAX_STOPS_PER_POSITION {
            match self.clock.next_mandatory_stop(&self.hos, remaining_drive) {
                StopDecision::None => {}
                StopDecision::Rest10h if self.clock.cycle_exhausted(&self.hos) => {
                    return Err(self.cycle_error(remaining_drive));
                }
                decision => {
                    self.take_hos_stop(decision, location)?;
                    continue;
                }
            }
            if remaining_drive.is_zero()
                || self.since_fuel + FUEL_SLACK < self.settings.fuel_interval
            {
                return Ok(());
            }
            self.perform_service(Reason::Fueling, location, None, self.settings.fuel_duration)?;
            self.since_fuel = Distance::ZERO;
        }
        Err(Error::Invariant(format!(
            "stops at {location} do not clear the clock"
        )))
    }

    fn cycle_error(&self, work: Duration) -> Error {
        Error::ComplianceUnreachable {
            needed: (self.hos.cycle_used + work).as_hours(),
            available: self.clock.limits().cycle_cap.as_hours(),
        }
    }

    pub fn finish(mut self) -> Timeline {
        self.close_drive();
        let shifts = self.stops.last().map(|stop| stop.shift).unwrap_or(self.shift);
        Timeline::new(self.stops, shifts)
    }
}
