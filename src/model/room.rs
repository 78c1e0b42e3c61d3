use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::member::Member;
use crate::model::trip::TripCriteria;
use crate::model::user::{Gender, UserProfile};

pub const MIN_ROOM_SIZE: u8 = 2;
pub const MAX_ROOM_SIZE: u8 = 6;
const DEFAULT_ROOM_SIZE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenderReq {

  #[serde(rename = "male-only")]
  MaleOnly,

  #[serde(rename = "female-only")]
  FemaleOnly,

  #[serde(rename = "common")]
  Common,
}

impl GenderReq {
  /// Whether the policy lets a rider of the given gender see or join the room.
  pub fn admits(&self, gender: Gender) -> bool {
    match self {
      GenderReq::MaleOnly => gender == Gender::Male,
      GenderReq::FemaleOnly => gender == Gender::Female,
      GenderReq::Common => true,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {

  #[serde(rename = "public")]
  Public,

  #[serde(rename = "private")]
  Private,
}

/// A public room carries a gender policy and never a code; a private
/// room always carries its 6-digit join code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomKind {

  #[serde(rename = "public")]
  Public {
    #[serde(rename = "genderReq")]
    gender_req: GenderReq,
  },

  #[serde(rename = "private")]
  Private { code: String },
}

/// Explicit creation parameters. `gender_req` only applies to public
/// rooms; private rooms gate on their code instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
  pub room_type: RoomType,
  pub gender_req: GenderReq,
  pub max_size: u8,
}

impl RoomConfig {
  pub fn is_valid(&self) -> bool {
    (MIN_ROOM_SIZE..=MAX_ROOM_SIZE).contains(&self.max_size)
  }
}

impl Default for RoomConfig {
  fn default() -> Self {
    RoomConfig {
      room_type: RoomType::Public,
      gender_req: GenderReq::Common,
      max_size: DEFAULT_ROOM_SIZE,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
  pub id: String,
  pub host_id: Uuid,
  pub host_name: String,

  #[serde(flatten)]
  pub trip: TripCriteria,

  #[serde(flatten)]
  pub kind: RoomKind,

  pub max_size: u8,
  pub members: Vec<Member>,
  pub serial_number: u16,
  pub created_at: DateTime<Utc>,
}

impl Room {
  /// A freshly created room with the host as its sole member. The id is
  /// assigned by the store on insert.
  pub fn new(host: &UserProfile, trip: TripCriteria, kind: RoomKind, max_size: u8, serial_number: u16) -> Self {
    Room {
      id: String::new(),
      host_id: host.id,
      host_name: host.name.clone(),
      trip,
      kind,
      max_size,
      members: vec![Member::snapshot(host)],
      serial_number,
      created_at: Utc::now(),
    }
  }

  pub fn is_private(&self) -> bool {
    matches!(self.kind, RoomKind::Private { .. })
  }

  pub fn is_full(&self) -> bool {
    self.members.len() >= self.max_size as usize
  }

  pub fn has_member(&self, uid: Uuid) -> bool {
    self.members.iter().any(|member| member.uid == uid)
  }

  pub fn gender_req(&self) -> Option<GenderReq> {
    match &self.kind {
      RoomKind::Public { gender_req } => Some(*gender_req),
      RoomKind::Private { .. } => None,
    }
  }

  pub fn code(&self) -> Option<&str> {
    match &self.kind {
      RoomKind::Public { .. } => None,
      RoomKind::Private { code } => Some(code.as_str()),
    }
  }
}
