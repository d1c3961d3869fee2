use std::{fmt::Display, sync::Arc};

use crate::{
    hos::Limits,
    shared::{
        geo::{Coordinate, Distance},
        time::{Duration, Time},
    },
};

/// Duty status of a timeline entry, as logged on an ELD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DutyStatus {
    OnDuty,
    OffDuty,
    SleeperBerth,
    Driving,
}

/// Why the truck is where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    Break30,
    Rest10h,
    Fueling,
    PickupPoint,
    DropoffPoint,
    None,
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Reason::Break30 => "Break30",
            Reason::Rest10h => "Rest10h",
            Reason::Fueling => "Fueling",
            Reason::PickupPoint => "PickupPoint",
            Reason::DropoffPoint => "DropoffPoint",
            Reason::None => "None",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub status: DutyStatus,
    pub reason: Reason,
    /// Where the entry starts. For a stop that is also where it ends.
    pub location: Coordinate,
    pub address: Option<Arc<str>>,
    pub start: Time,
    pub end: Time,
    pub duration: Duration,
    pub shift: u32,
    /// Distance driven during the entry, zero for anything but driving.
    pub distance: Distance,
    /// Cycle time used once the entry is over.
    pub cycle_used: Duration,
}

impl Stop {
    pub fn is_driving(&self) -> bool {
        self.status == DutyStatus::Driving
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    stops: Vec<Stop>,
    shifts: u32,
}

impl Timeline {
    pub(crate) fn new(stops: Vec<Stop>, shifts: u32) -> Self {
        Self { stops, shifts }
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stops_mut(&mut self) -> &mut [Stop] {
        &mut self.stops
    }

    pub fn into_stops(self) -> Vec<Stop> {
        self.stops
    }

    pub fn shifts(&self) -> u32 {
        self.shifts
    }

    pub fn departure(&self) -> Option<Time> {
        self.stops.first().map(|stop| stop.start)
    }

    /// End of the dropoff, which is the end of the trip.
    pub fn arrival(&self) -> Option<Time> {
        self.stops
            .iter()
            .rev()
            .find(|stop| stop.reason == Reason::DropoffPoint)
            .map(|stop| stop.end)
    }

    pub fn driving_time(&self) -> Duration {
        self.stops
            .iter()
            .filter(|stop| stop.is_driving())
            .map(|stop| stop.duration)
            .sum()
    }

    pub fn driven_distance(&self) -> Distance {
        self.stops.iter().map(|stop| stop.distance).sum()
    }

    pub fn count(&self, reason: Reason) -> usize {
        self.stops.iter().filter(|stop| stop.reason == reason).count()
    }

    /// Replays the timeline against `limits` and reports the first entry
    /// that breaks contiguity or an Hours-of-Service rule.
    pub fn audit(&self, limits: &Limits) -> Result<(), String> {
        let mut driving_since_break = Duration::ZERO;
        let mut driving_since_rest = Duration::ZERO;
        let mut window = Duration::ZERO;
        let mut previous: Option<&Stop> = None;
        let mut shift = 1;

        for (i, stop) in self.stops.iter().enumerate() {
            if stop.start + stop.duration != stop.end {
                return Err(format!("entry {i} ends at {} but lasts {}", stop.end, stop.duration));
            }
            if let Some(previous) = previous {
                if previous.end != stop.start {
                    return Err(format!(
                        "entry {i} starts at {} but entry {} ends at {}",
                        stop.start,
                        i - 1,
                        previous.end
                    ));
                }
                if stop.cycle_used < previous.cycle_used {
                    return Err(format!("cycle time goes backwards at entry {i}"));
                }
                if previous.reason == Reason::Rest10h {
                    shift += 1;
                }
            }
            if stop.shift != shift {
                return Err(format!("entry {i} is in shift {} instead of {shift}", stop.shift));
            }
            if stop.cycle_used > limits.cycle_cap {
                return Err(format!("entry {i} runs the cycle to {}", stop.cycle_used));
            }

            match stop.status {
                DutyStatus::Driving => {
                    driving_since_break += stop.duration;
                    driving_since_rest += stop.duration;
                    window += stop.duration;
                }
                DutyStatus::OnDuty => window += stop.duration,
                DutyStatus::OffDuty => {
                    window += stop.duration;
                    if stop.duration >= limits.break_duration {
                        driving_since_break = Duration::ZERO;
                    }
                }
                DutyStatus::SleeperBerth => {
                    if stop.duration >= limits.rest_duration {
                        driving_since_break = Duration::ZERO;
                        driving_since_rest = Duration::ZERO;
                        window = Duration::ZERO;
                    } else {
                        window += stop.duration;
                    }
                }
            }

            if driving_since_break > limits.driving_before_break {
                return Err(format!("entry {i} drives {driving_since_break} without a break"));
            }
            if driving_since_rest > limits.driving_per_shift {
                return Err(format!("entry {i} drives {driving_since_rest} in one shift"));
            }
            if window > limits.duty_window {
                return Err(format!("entry {i} stretches the duty window to {window}"));
            }
            previous = Some(stop);
        }

        if self.stops.last().map(|stop| stop.shift).unwrap_or(1) != self.shifts {
            return Err(format!("timeline claims {} shifts", self.shifts));
        }
        Ok(())
    }
}
