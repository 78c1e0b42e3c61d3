use std::convert::TryFrom;
use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
  static ref TIME_SLOT_REGEX: Regex = Regex::new("^([01][0-9]|2[0-3]):([0-5][0-9])$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {

  #[serde(rename = "to-destination")]
  ToDestination,

  #[serde(rename = "from-destination")]
  FromDestination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {

  #[serde(rename = "airport")]
  Airport,

  #[serde(rename = "railway")]
  RailwayStation,

  #[serde(rename = "mgr")]
  MgrStation,

  #[serde(rename = "vitc")]
  Campus,
}

/// Time of day a trip departs, kept as minutes since midnight.
/// Rendered on the wire as "HH:MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(u16);

impl TimeSlot {
  pub fn parse(value: &str) -> Option<Self> {
    let captures = TIME_SLOT_REGEX.captures(value)?;
    let hours: u16 = captures.get(1)?.as_str().parse().ok()?;
    let minutes: u16 = captures.get(2)?.as_str().parse().ok()?;
    Some(TimeSlot(hours * 60 + minutes))
  }

  pub fn minutes_of_day(&self) -> u16 {
    self.0
  }
}

impl fmt::Display for TimeSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
  }
}

impl TryFrom<String> for TimeSlot {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::parse(&value).ok_or_else(|| format!("invalid time slot: {}", value))
  }
}

impl From<TimeSlot> for String {
  fn from(slot: TimeSlot) -> Self {
    slot.to_string()
  }
}

/// What a rider is searching for and what a room is scheduled as.
/// Destination, date and direction match exactly; the slot matches by
/// proximity (see matcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCriteria {
  pub direction: Direction,
  pub destination: Destination,
  pub date: NaiveDate,
  pub time_slot: TimeSlot,
}
