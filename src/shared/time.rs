use std::{
    cmp,
    fmt::Display,
    ops::Add,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::geo::Distance;

pub type Timestamp = DateTime<Utc>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(f64);

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

/// Rounded to whole minutes, with hours split out past the hour mark.
impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let minutes = self.as_minutes().round() as u64;
        if minutes < 60 {
            write!(f, "{}min", minutes)
        } else {
            write!(f, "{}h {}min", minutes / 60, minutes % 60)
        }
    }
}

impl Duration {
    pub const fn from_seconds(secs: f64) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> f64 {
        self.0
    }

    pub const fn as_minutes(&self) -> f64 {
        self.0 / 60.0
    }
}

/// Constant travel speed used for straight-line time estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Speed(f64);

impl Default for Speed {
    fn default() -> Self {
        Self::CITY_DRIVING
    }
}

impl Speed {
    pub const CITY_DRIVING: Speed = Speed::from_kmh(30.0);

    pub const fn from_kmh(kmh: f64) -> Self {
        Self(kmh)
    }

    pub const fn as_kmh(&self) -> f64 {
        self.0
    }

    /// Time to cover `distance` at this speed. This is a heuristic, it knows
    /// nothing about the road network or traffic.
    pub fn time_for(&self, distance: Distance) -> Duration {
        Duration::from_seconds(distance.as_kilometers() / self.0 * 3600.0)
    }
}

#[test]
fn minutes_display() {
    assert_eq!(Duration::from_seconds(22.0).to_string(), "0min");
    assert_eq!(Duration::from_seconds(14.0 * 60.0).to_string(), "14min");
    assert_eq!(Duration::from_seconds(59.0 * 60.0).to_string(), "59min");
}

#[test]
fn hours_display() {
    assert_eq!(Duration::from_seconds(60.0 * 60.0).to_string(), "1h 0min");
    assert_eq!(Duration::from_seconds(125.0 * 60.0).to_string(), "2h 5min");
}

#[test]
fn city_speed_time() {
    let time = Speed::CITY_DRIVING.time_for(Distance::from_kilometers(15.0));
    assert_eq!(time.as_minutes(), 30.0);
}
