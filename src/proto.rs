use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{GenderFilter, SearchContext};
use crate::model::room::{Room, RoomConfig};
use crate::model::trip::TripCriteria;
use crate::model::user::Gender;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Input {

  #[serde(rename = "hello")]
  Hello(HelloInput),

  #[serde(rename = "search-rooms")]
  SearchRooms(SearchInput),

  #[serde(rename = "create-room")]
  CreateRoom(CreateRoomInput),

  #[serde(rename = "join-room")]
  JoinRoom(JoinRoomInput),

  #[serde(rename = "join-by-code")]
  JoinByCode(JoinByCodeInput),

  #[serde(rename = "leave-room")]
  LeaveRoom(LeaveRoomInput),

  #[serde(rename = "load-my-rooms")]
  LoadMyRooms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloInput {
  pub name: String,
  pub gender: Gender,
  pub email: String,
  pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
  #[serde(flatten)]
  pub trip: TripCriteria,
  pub filter: GenderFilter,
}

impl SearchInput {
  pub fn into_context(self) -> SearchContext {
    SearchContext {
      trip: self.trip,
      filter: self.filter,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomInput {
  pub trip: TripCriteria,
  pub config: RoomConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomInput {
  pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinByCodeInput {
  pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomInput {
  pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Output {

  #[serde(rename = "error")]
  Error(OutputError),

  #[serde(rename = "session-ready")]
  SessionReady,

  #[serde(rename = "rooms-matched")]
  RoomsMatched(RoomsMatchedOutput),

  #[serde(rename = "my-rooms")]
  MyRooms(MyRoomsOutput),

  #[serde(rename = "room-created")]
  RoomCreated(RoomCreatedOutput),

  #[serde(rename = "joined")]
  Joined(JoinedOutput),

  #[serde(rename = "left")]
  Left(LeftOutput),

  #[serde(rename = "room-updated")]
  RoomUpdated(RoomUpdatedOutput),

  #[serde(rename = "room-removed")]
  RoomRemoved(RoomRemovedOutput),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum OutputError {

  #[serde(rename = "already-in-room")]
  AlreadyInRoom,

  #[serde(rename = "room-full")]
  RoomFull,

  #[serde(rename = "gender-ineligible")]
  GenderIneligible,

  #[serde(rename = "invalid-code")]
  InvalidCode,

  #[serde(rename = "room-not-found")]
  RoomNotFound,

  #[serde(rename = "not-a-member")]
  NotAMember,

  #[serde(rename = "invalid-room-config")]
  InvalidRoomConfig,

  #[serde(rename = "profile-missing")]
  ProfileMissing,

  #[serde(rename = "store-unavailable")]
  StoreUnavailable,
}

#[derive(Debug, Clone)]
pub struct InputParcel {
  pub user_id: Uuid,
  pub input: Input,
}

impl InputParcel {
  pub fn new(user_id: Uuid, input: Input) -> Self {
    InputParcel { user_id, input }
  }
}

#[derive(Debug, Clone)]
pub struct OutputParcel {
  pub user_id: Uuid,
  pub output: Output,
}

impl OutputParcel {
  pub fn new(user_id: Uuid, output: Output) -> Self {
    OutputParcel { user_id, output }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsMatchedOutput {
  pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRoomsOutput {
  pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreatedOutput {
  pub room: Room,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedOutput {
  pub room: Room,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeftOutput {
  pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdatedOutput {
  pub room: Room,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRemovedOutput {
  pub room_id: String,
}

impl RoomsMatchedOutput {
  pub fn new(rooms: Vec<Room>) -> Self {
    RoomsMatchedOutput { rooms }
  }
}

impl MyRoomsOutput {
  pub fn new(rooms: Vec<Room>) -> Self {
    MyRoomsOutput { rooms }
  }
}

impl RoomCreatedOutput {
  pub fn new(room: Room) -> Self {
    RoomCreatedOutput { room }
  }
}

impl JoinedOutput {
  pub fn new(room: Room) -> Self {
    JoinedOutput { room }
  }
}

impl LeftOutput {
  pub fn new(room_id: String) -> Self {
    LeftOutput { room_id }
  }
}

impl RoomUpdatedOutput {
  pub fn new(room: Room) -> Self {
    RoomUpdatedOutput { room }
  }
}

impl RoomRemovedOutput {
  pub fn new(room_id: String) -> Self {
    RoomRemovedOutput { room_id }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_tagged_inputs() {
    let raw = r#"{
      "type": "search-rooms",
      "payload": {
        "direction": "to-destination",
        "destination": "airport",
        "date": "2025-06-01",
        "timeSlot": "09:00",
        "filter": "all"
      }
    }"#;
    let input: Input = serde_json::from_str(raw).unwrap();
    match input {
      Input::SearchRooms(search) => {
        assert_eq!(search.trip.time_slot.to_string(), "09:00");
        assert_eq!(search.filter, GenderFilter::All);
      }
      other => panic!("unexpected input: {:?}", other),
    }
  }

  #[test]
  fn decodes_join_by_code() {
    let raw = r#"{"type": "join-by-code", "payload": {"code": "123456"}}"#;
    let input: Input = serde_json::from_str(raw).unwrap();
    assert_eq!(input, Input::JoinByCode(JoinByCodeInput { code: String::from("123456") }));
  }

  #[test]
  fn encodes_error_with_code_tag() {
    let json = serde_json::to_value(Output::Error(OutputError::RoomFull)).unwrap();
    assert_eq!(json["type"], "error");
    assert_eq!(json["payload"]["code"], "room-full");
  }
}
