use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::model::member::Member;
use crate::model::room::Room;

const EVENT_CHANNEL_SIZE: usize = 65536;

pub type RoomId = String;

#[derive(Debug, Error)]
pub enum StoreError {

  #[error("room not found: {0}")]
  NotFound(RoomId),

  #[error("room is at capacity: {0}")]
  Full(RoomId),

  #[error("store unavailable: {0}")]
  Unavailable(String),
}

/// Change notification pushed to every subscriber after a successful
/// mutation, carrying the post-operation document state.
#[derive(Debug, Clone)]
pub enum StoreEvent {
  Created(Room),
  Updated(Room),
  Removed(Room),
}

/// Outcome of a member removal: either the room survives with the
/// remaining members, or removing the last member deleted it.
#[derive(Debug, Clone)]
pub enum Removal {
  Remaining(Room),
  Deleted(RoomId),
}

/// Live room collection. Member mutations are set operations so that
/// concurrent joins by different riders commute and a retried join or
/// leave is a no-op rather than a duplicate or an error.
#[async_trait]
pub trait RoomStore: Send + Sync {
  /// Inserts the room, assigning its id, and returns the stored document.
  async fn create(&self, room: Room) -> Result<Room, StoreError>;

  async fn get(&self, id: &str) -> Result<Option<Room>, StoreError>;

  async fn snapshot(&self) -> Result<Vec<Room>, StoreError>;

  /// Set-union add. Re-adding an existing uid leaves the room unchanged.
  async fn add_member(&self, id: &str, member: Member) -> Result<Room, StoreError>;

  /// Set-difference removal; deletes the room when it would reach zero
  /// members, so a room below one member is never observable.
  async fn remove_member(&self, id: &str, uid: Uuid) -> Result<Removal, StoreError>;

  async fn delete(&self, id: &str) -> Result<(), StoreError>;

  async fn find_by_code(&self, code: &str) -> Result<Option<Room>, StoreError>;

  fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

pub struct MemoryRoomStore {
  rooms: RwLock<HashMap<RoomId, Room>>,
  event_sender: broadcast::Sender<StoreEvent>,
}

impl MemoryRoomStore {
  pub fn new() -> Self {
    let (event_sender, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
    MemoryRoomStore {
      rooms: Default::default(),
      event_sender,
    }
  }

  fn publish(&self, event: StoreEvent) {
    if self.event_sender.receiver_count() > 0 {
      // a send only fails with no receivers, which we just ruled out
      let _ = self.event_sender.send(event);
    }
  }
}

impl Default for MemoryRoomStore {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
  async fn create(&self, mut room: Room) -> Result<Room, StoreError> {
    room.id = Uuid::new_v4().to_string();
    let stored = room.clone();
    self.rooms.write().await.insert(room.id.clone(), room);
    debug!("room {} created", stored.id);
    self.publish(StoreEvent::Created(stored.clone()));
    Ok(stored)
  }

  async fn get(&self, id: &str) -> Result<Option<Room>, StoreError> {
    Ok(self.rooms.read().await.get(id).cloned())
  }

  async fn snapshot(&self) -> Result<Vec<Room>, StoreError> {
    Ok(self.rooms.read().await.values().cloned().collect())
  }

  async fn add_member(&self, id: &str, member: Member) -> Result<Room, StoreError> {
    let mut rooms = self.rooms.write().await;
    let room = rooms.get_mut(id).ok_or_else(|| StoreError::NotFound(String::from(id)))?;

    if room.has_member(member.uid) {
      return Ok(room.clone());
    }
    if room.is_full() {
      return Err(StoreError::Full(String::from(id)));
    }

    room.members.push(member);
    let updated = room.clone();
    drop(rooms);

    self.publish(StoreEvent::Updated(updated.clone()));
    Ok(updated)
  }

  async fn remove_member(&self, id: &str, uid: Uuid) -> Result<Removal, StoreError> {
    let mut rooms = self.rooms.write().await;
    let room = rooms.get_mut(id).ok_or_else(|| StoreError::NotFound(String::from(id)))?;

    room.members.retain(|member| member.uid != uid);
    if room.members.is_empty() {
      let removed = rooms.remove(id).ok_or_else(|| StoreError::NotFound(String::from(id)))?;
      drop(rooms);
      debug!("room {} emptied and deleted", id);
      self.publish(StoreEvent::Removed(removed));
      Ok(Removal::Deleted(String::from(id)))
    } else {
      let updated = room.clone();
      drop(rooms);
      self.publish(StoreEvent::Updated(updated.clone()));
      Ok(Removal::Remaining(updated))
    }
  }

  async fn delete(&self, id: &str) -> Result<(), StoreError> {
    let removed = self
      .rooms
      .write()
      .await
      .remove(id)
      .ok_or_else(|| StoreError::NotFound(String::from(id)))?;
    self.publish(StoreEvent::Removed(removed));
    Ok(())
  }

  async fn find_by_code(&self, code: &str) -> Result<Option<Room>, StoreError> {
    // first match wins
    Ok(
      self
        .rooms
        .read()
        .await
        .values()
        .find(|room| room.code() == Some(code))
        .cloned(),
    )
  }

  fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
    self.event_sender.subscribe()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::model::room::{GenderReq, RoomKind};
  use crate::model::trip::{Destination, Direction, TimeSlot, TripCriteria};
  use crate::model::user::{Gender, UserProfile};
  use chrono::NaiveDate;

  fn trip() -> TripCriteria {
    TripCriteria {
      direction: Direction::ToDestination,
      destination: Destination::Airport,
      date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
      time_slot: TimeSlot::parse("09:00").unwrap(),
    }
  }

  fn rider(name: &str, gender: Gender) -> UserProfile {
    UserProfile::new(Uuid::new_v4(), "rider@vitstudent.ac.in", name, gender, None)
  }

  fn public_room(host: &UserProfile, max_size: u8) -> Room {
    Room::new(host, trip(), RoomKind::Public { gender_req: GenderReq::Common }, max_size, 1)
  }

  #[tokio::test]
  async fn create_assigns_id_and_emits_event() {
    let store = MemoryRoomStore::new();
    let mut events = store.subscribe();

    let stored = store.create(public_room(&rider("Host", Gender::Male), 4)).await.unwrap();
    assert!(!stored.id.is_empty());
    assert_eq!(store.get(&stored.id).await.unwrap().unwrap(), stored);

    match events.recv().await.unwrap() {
      StoreEvent::Created(room) => assert_eq!(room.id, stored.id),
      other => panic!("unexpected event: {:?}", other),
    }
  }

  #[tokio::test]
  async fn add_member_is_idempotent_per_uid() {
    let store = MemoryRoomStore::new();
    let host = rider("Host", Gender::Male);
    let stored = store.create(public_room(&host, 4)).await.unwrap();

    let guest = rider("Guest", Gender::Female);
    let member = Member::snapshot(&guest);
    let after_first = store.add_member(&stored.id, member.clone()).await.unwrap();
    assert_eq!(after_first.members.len(), 2);

    let after_retry = store.add_member(&stored.id, member).await.unwrap();
    assert_eq!(after_retry.members.len(), 2);
  }

  #[tokio::test]
  async fn add_member_rejects_at_capacity() {
    let store = MemoryRoomStore::new();
    let stored = store.create(public_room(&rider("Host", Gender::Male), 2)).await.unwrap();

    store
      .add_member(&stored.id, Member::snapshot(&rider("Second", Gender::Male)))
      .await
      .unwrap();
    let result = store
      .add_member(&stored.id, Member::snapshot(&rider("Third", Gender::Male)))
      .await;
    assert!(matches!(result, Err(StoreError::Full(_))));
    assert_eq!(store.get(&stored.id).await.unwrap().unwrap().members.len(), 2);
  }

  #[tokio::test]
  async fn removing_last_member_deletes_room() {
    let store = MemoryRoomStore::new();
    let host = rider("Host", Gender::Male);
    let stored = store.create(public_room(&host, 4)).await.unwrap();

    let removal = store.remove_member(&stored.id, host.id).await.unwrap();
    assert!(matches!(removal, Removal::Deleted(_)));
    assert!(store.get(&stored.id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn removing_one_of_two_keeps_room() {
    let store = MemoryRoomStore::new();
    let host = rider("Host", Gender::Male);
    let guest = rider("Guest", Gender::Female);
    let stored = store.create(public_room(&host, 4)).await.unwrap();
    store.add_member(&stored.id, Member::snapshot(&guest)).await.unwrap();

    let removal = store.remove_member(&stored.id, guest.id).await.unwrap();
    match removal {
      Removal::Remaining(room) => {
        assert_eq!(room.members.len(), 1);
        assert_eq!(room.members[0].uid, host.id);
      }
      other => panic!("unexpected removal: {:?}", other),
    }
  }

  #[tokio::test]
  async fn concurrent_joins_both_land() {
    let store = Arc::new(MemoryRoomStore::new());
    let stored = store.create(public_room(&rider("Host", Gender::Male), 4)).await.unwrap();

    let a = rider("A", Gender::Male);
    let b = rider("B", Gender::Female);
    let (first, second) = tokio::join!(
      store.add_member(&stored.id, Member::snapshot(&a)),
      store.add_member(&stored.id, Member::snapshot(&b)),
    );
    first.unwrap();
    second.unwrap();

    let room = store.get(&stored.id).await.unwrap().unwrap();
    assert_eq!(room.members.len(), 3);
    assert!(room.has_member(a.id));
    assert!(room.has_member(b.id));
  }

  #[tokio::test]
  async fn find_by_code_matches_private_rooms_only() {
    let store = MemoryRoomStore::new();
    let host = rider("Host", Gender::Male);
    store.create(public_room(&host, 4)).await.unwrap();
    let private = store
      .create(Room::new(&rider("Other", Gender::Female), trip(), RoomKind::Private { code: String::from("424242") }, 2, 9))
      .await
      .unwrap();

    let found = store.find_by_code("424242").await.unwrap().unwrap();
    assert_eq!(found.id, private.id);
    assert!(store.find_by_code("000000").await.unwrap().is_none());
  }
}
