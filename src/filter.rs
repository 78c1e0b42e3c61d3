use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matcher::{is_near, PROXIMITY_TOLERANCE_MINUTES};
use crate::model::room::{GenderReq, Room};
use crate::model::trip::TripCriteria;
use crate::model::user::Gender;

/// The rider-selected narrowing on top of the policy filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenderFilter {

  #[serde(rename = "all")]
  All,

  #[serde(rename = "male-only")]
  MaleOnly,

  #[serde(rename = "female-only")]
  FemaleOnly,

  #[serde(rename = "common")]
  Common,
}

impl GenderFilter {
  fn keeps(&self, gender_req: GenderReq) -> bool {
    match self {
      GenderFilter::All => true,
      GenderFilter::MaleOnly => gender_req == GenderReq::MaleOnly,
      GenderFilter::FemaleOnly => gender_req == GenderReq::FemaleOnly,
      GenderFilter::Common => gender_req == GenderReq::Common,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContext {
  #[serde(flatten)]
  pub trip: TripCriteria,
  pub filter: GenderFilter,
}

/// The rooms a rider may see for a search: exact destination/date/direction,
/// slot within tolerance, public only, gender policy admitting the rider,
/// then the rider's own filter. Recomputed in full from the latest store
/// snapshot on every change event.
pub fn visible_rooms(rooms: &[Room], search: &SearchContext, requester: Gender) -> Vec<Room> {
  rooms
    .iter()
    .filter(|room| {
      room.trip.destination == search.trip.destination
        && room.trip.date == search.trip.date
        && room.trip.direction == search.trip.direction
    })
    .filter(|room| is_near(room.trip.time_slot, search.trip.time_slot, PROXIMITY_TOLERANCE_MINUTES))
    .filter(|room| match room.gender_req() {
      // private rooms are never surfaced by search
      None => false,
      Some(req) => req.admits(requester) && search.filter.keeps(req),
    })
    .cloned()
    .collect()
}

/// Membership scan over the full room set. No gender filtering: a rider
/// always sees rooms they already belong to.
pub fn rooms_of(rooms: &[Room], uid: Uuid) -> Vec<Room> {
  rooms.iter().filter(|room| room.has_member(uid)).cloned().collect()
}
