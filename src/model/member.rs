use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::user::{Gender, UserProfile};

/// Snapshot of a rider embedded in a room document, taken at join time.
/// Does not track later profile edits. Contact is only shown to fellow
/// members by the UI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
  pub uid: Uuid,
  pub name: String,
  pub gender: Gender,
  pub contact: Option<String>,
}

impl Member {
  pub fn snapshot(profile: &UserProfile) -> Self {
    Member {
      uid: profile.id,
      name: profile.name.clone(),
      gender: profile.gender,
      contact: profile.contact.clone(),
    }
  }
}
