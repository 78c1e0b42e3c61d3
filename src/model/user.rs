use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  Male,
  Female,
}

/// Profile snapshot handed over by the auth/onboarding collaborator at
/// session start. Read-only for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub id: Uuid,
  pub email: String,
  pub name: String,
  pub gender: Gender,
  pub contact: Option<String>,
}

impl UserProfile {
  pub fn new(id: Uuid, email: &str, name: &str, gender: Gender, contact: Option<String>) -> Self {
    UserProfile {
      id,
      email: String::from(email),
      name: String::from(name),
      gender,
      contact,
    }
  }
}
