use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {

  #[error("system error: {0}")]
  System(String),

  #[error("malformed message: {0}")]
  Message(#[from] serde_json::Error),

  #[error(transparent)]
  Store(#[from] StoreError),
}
