use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use lazy_static::lazy_static;
use log::{error, info, warn};
use rand::Rng;
use regex::Regex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::filter::{rooms_of, visible_rooms, SearchContext};
use crate::model::member::Member;
use crate::model::room::{Room, RoomKind, RoomType};
use crate::model::user::UserProfile;
use crate::proto::*;
use crate::store::{Removal, RoomStore, StoreError, StoreEvent};

const OUTPUT_CHANNEL_SIZE: usize = 65536;
const MAX_CODE_ATTEMPTS: usize = 32;

lazy_static! {
  static ref ROOM_CODE_REGEX: Regex = Regex::new("^[0-9]{6}$").unwrap();
}

struct Session {
  profile: UserProfile,
  search: Option<SearchContext>,
}

/// Membership controller. All mutations arrive through a single input
/// channel and are processed one at a time, which serializes every
/// check-then-mutate (one room per user, capacity, last-member delete)
/// against the store.
pub struct Hub {
  output_sender: broadcast::Sender<OutputParcel>,
  sessions: RwLock<HashMap<Uuid, Session>>,
  store: Arc<dyn RoomStore>,
}

impl Hub {
  pub fn new(store: Arc<dyn RoomStore>) -> Self {
    let (output_sender, _) = broadcast::channel(OUTPUT_CHANNEL_SIZE);
    Hub {
      output_sender,
      sessions: Default::default(),
      store,
    }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<OutputParcel> {
    self.output_sender.subscribe()
  }

  pub async fn run(&self, receiver: UnboundedReceiver<InputParcel>) {
    let processing =
      UnboundedReceiverStream::new(receiver).for_each(|input_parcel| self.process(input_parcel));
    let watching = self.watch_store();

    tokio::select! {
      _ = processing => {},
      _ = watching => {},
    }
  }

  pub async fn on_disconnect(&self, user_id: Uuid) {
    if self.sessions.write().await.remove(&user_id).is_some() {
      info!("session closed for {}", user_id);
    }
  }

  async fn process(&self, input_parcel: InputParcel) {
    let user_id = input_parcel.user_id;
    match input_parcel.input {
      Input::Hello(input) => self.process_hello(user_id, input).await,
      Input::SearchRooms(input) => self.process_search(user_id, input).await,
      Input::CreateRoom(input) => self.process_create(user_id, input).await,
      Input::JoinRoom(input) => self.process_join(user_id, input).await,
      Input::JoinByCode(input) => self.process_join_by_code(user_id, input).await,
      Input::LeaveRoom(input) => self.process_leave(user_id, input).await,
      Input::LoadMyRooms => self.process_load_my_rooms(user_id).await,
    }
  }

  async fn process_hello(&self, user_id: Uuid, input: HelloInput) {
    let profile = UserProfile::new(user_id, &input.email, &input.name, input.gender, input.contact);
    self
      .sessions
      .write()
      .await
      .insert(user_id, Session { profile, search: None });

    info!("session ready for {}", user_id);
    self.send_targeted(user_id, Output::SessionReady);
  }

  async fn process_search(&self, user_id: Uuid, input: SearchInput) {
    let context = input.into_context();

    // remember the context so store changes re-push recomputed matches
    let gender = {
      let mut sessions = self.sessions.write().await;
      sessions.get_mut(&user_id).map(|session| {
        session.search = Some(context);
        session.profile.gender
      })
    };
    let gender = match gender {
      Some(gender) => gender,
      None => {
        self.send_error(user_id, OutputError::ProfileMissing);
        return;
      }
    };

    let snapshot = match self.store.snapshot().await {
      Ok(snapshot) => snapshot,
      Err(err) => {
        self.report_store_error(user_id, &err);
        return;
      }
    };

    let rooms = visible_rooms(&snapshot, &context, gender);
    self.send_targeted(user_id, Output::RoomsMatched(RoomsMatchedOutput::new(rooms)));
  }

  async fn process_create(&self, user_id: Uuid, input: CreateRoomInput) {
    let profile = match self.profile_of(user_id).await {
      Some(profile) => profile,
      None => {
        self.send_error(user_id, OutputError::ProfileMissing);
        return;
      }
    };

    if !input.config.is_valid() {
      self.send_error(user_id, OutputError::InvalidRoomConfig);
      return;
    }

    let snapshot = match self.store.snapshot().await {
      Ok(snapshot) => snapshot,
      Err(err) => {
        self.report_store_error(user_id, &err);
        return;
      }
    };

    // one room per user, checked across the full set
    if snapshot.iter().any(|room| room.has_member(user_id)) {
      self.send_error(user_id, OutputError::AlreadyInRoom);
      return;
    }

    let kind = match input.config.room_type {
      RoomType::Public => RoomKind::Public { gender_req: input.config.gender_req },
      RoomType::Private => match Self::generate_code(&snapshot) {
        Some(code) => RoomKind::Private { code },
        None => {
          error!("could not allocate an unused room code after {} attempts", MAX_CODE_ATTEMPTS);
          self.send_error(user_id, OutputError::StoreUnavailable);
          return;
        }
      },
    };

    let serial_number: u16 = rand::thread_rng().gen_range(0..10_000);
    let room = Room::new(&profile, input.trip, kind, input.config.max_size, serial_number);

    match self.store.create(room).await {
      Ok(stored) => {
        info!("{} created room {}", user_id, stored.id);
        self.send_targeted(user_id, Output::RoomCreated(RoomCreatedOutput::new(stored)));
      }
      Err(err) => self.report_store_error(user_id, &err),
    }
  }

  async fn process_join(&self, user_id: Uuid, input: JoinRoomInput) {
    let profile = match self.profile_of(user_id).await {
      Some(profile) => profile,
      None => {
        self.send_error(user_id, OutputError::ProfileMissing);
        return;
      }
    };

    let room = match self.store.get(&input.room_id).await {
      Ok(Some(room)) => room,
      Ok(None) => {
        self.send_error(user_id, OutputError::RoomNotFound);
        return;
      }
      Err(err) => {
        self.report_store_error(user_id, &err);
        return;
      }
    };

    // private rooms are only reachable through their code
    if room.is_private() {
      self.send_error(user_id, OutputError::InvalidCode);
      return;
    }

    self.try_join(&profile, room).await;
  }

  async fn process_join_by_code(&self, user_id: Uuid, input: JoinByCodeInput) {
    let profile = match self.profile_of(user_id).await {
      Some(profile) => profile,
      None => {
        self.send_error(user_id, OutputError::ProfileMissing);
        return;
      }
    };

    if !ROOM_CODE_REGEX.is_match(&input.code) {
      self.send_error(user_id, OutputError::InvalidCode);
      return;
    }

    match self.store.find_by_code(&input.code).await {
      Ok(Some(room)) => self.try_join(&profile, room).await,
      Ok(None) => self.send_error(user_id, OutputError::InvalidCode),
      Err(err) => self.report_store_error(user_id, &err),
    }
  }

  async fn try_join(&self, profile: &UserProfile, room: Room) {
    let user_id = profile.id;

    let snapshot = match self.store.snapshot().await {
      Ok(snapshot) => snapshot,
      Err(err) => {
        self.report_store_error(user_id, &err);
        return;
      }
    };

    // covers both "already in this room" and "already in another room"
    if snapshot.iter().any(|candidate| candidate.has_member(user_id)) {
      self.send_error(user_id, OutputError::AlreadyInRoom);
      return;
    }

    if room.is_full() {
      self.send_error(user_id, OutputError::RoomFull);
      return;
    }

    // gender policy gates public rooms only
    if let Some(req) = room.gender_req() {
      if !req.admits(profile.gender) {
        self.send_error(user_id, OutputError::GenderIneligible);
        return;
      }
    }

    match self.store.add_member(&room.id, Member::snapshot(profile)).await {
      Ok(updated) => {
        info!("{} joined room {} ({}/{})", user_id, updated.id, updated.members.len(), updated.max_size);
        self.send_targeted(user_id, Output::Joined(JoinedOutput::new(updated)));
      }
      Err(err) => self.report_store_error(user_id, &err),
    }
  }

  async fn process_leave(&self, user_id: Uuid, input: LeaveRoomInput) {
    if self.profile_of(user_id).await.is_none() {
      self.send_error(user_id, OutputError::ProfileMissing);
      return;
    }

    let room = match self.store.get(&input.room_id).await {
      Ok(Some(room)) => room,
      Ok(None) => {
        self.send_error(user_id, OutputError::RoomNotFound);
        return;
      }
      Err(err) => {
        self.report_store_error(user_id, &err);
        return;
      }
    };

    if !room.has_member(user_id) {
      self.send_error(user_id, OutputError::NotAMember);
      return;
    }

    match self.store.remove_member(&room.id, user_id).await {
      Ok(Removal::Deleted(room_id)) => {
        info!("room {} deleted after its last member left", room_id);
        self.send_targeted(user_id, Output::Left(LeftOutput::new(room_id)));
      }
      Ok(Removal::Remaining(updated)) => {
        info!("{} left room {} ({}/{})", user_id, updated.id, updated.members.len(), updated.max_size);
        self.send_targeted(user_id, Output::Left(LeftOutput::new(updated.id)));
      }
      Err(err) => self.report_store_error(user_id, &err),
    }
  }

  async fn process_load_my_rooms(&self, user_id: Uuid) {
    if self.profile_of(user_id).await.is_none() {
      self.send_error(user_id, OutputError::ProfileMissing);
      return;
    }

    let snapshot = match self.store.snapshot().await {
      Ok(snapshot) => snapshot,
      Err(err) => {
        self.report_store_error(user_id, &err);
        return;
      }
    };

    let rooms = rooms_of(&snapshot, user_id);
    self.send_targeted(user_id, Output::MyRooms(MyRoomsOutput::new(rooms)));
  }

  async fn watch_store(&self) {
    let mut events = self.store.subscribe();
    loop {
      match events.recv().await {
        Ok(event) => self.fan_out(event).await,
        Err(broadcast::error::RecvError::Lagged(skipped)) => {
          warn!("store event stream lagged, skipped {} events", skipped);
        }
        Err(broadcast::error::RecvError::Closed) => break,
      }
    }
  }

  /// Push-based sync: every store change re-runs the full matching
  /// pipeline for each session with a live search context, and tells
  /// current members about changes to their room.
  async fn fan_out(&self, event: StoreEvent) {
    let snapshot = match self.store.snapshot().await {
      Ok(snapshot) => snapshot,
      Err(err) => {
        error!("store snapshot failed during fan-out: {}", err);
        return;
      }
    };

    let sessions = self.sessions.read().await;
    for (user_id, session) in sessions.iter() {
      if let Some(search) = &session.search {
        let rooms = visible_rooms(&snapshot, search, session.profile.gender);
        self.send_targeted(*user_id, Output::RoomsMatched(RoomsMatchedOutput::new(rooms)));
      }
    }

    match event {
      StoreEvent::Created(_) => {}
      StoreEvent::Updated(room) => {
        for member in &room.members {
          if sessions.contains_key(&member.uid) {
            self.send_targeted(member.uid, Output::RoomUpdated(RoomUpdatedOutput::new(room.clone())));
          }
        }
      }
      StoreEvent::Removed(room) => {
        for member in &room.members {
          if sessions.contains_key(&member.uid) {
            self.send_targeted(member.uid, Output::RoomRemoved(RoomRemovedOutput::new(room.id.clone())));
          }
        }
      }
    }
  }

  fn generate_code(rooms: &[Room]) -> Option<String> {
    let mut rng = rand::thread_rng();
    for _ in 0..MAX_CODE_ATTEMPTS {
      let code = rng.gen_range(100_000..1_000_000).to_string();
      if !rooms.iter().any(|room| room.code() == Some(code.as_str())) {
        return Some(code);
      }
    }
    None
  }

  async fn profile_of(&self, user_id: Uuid) -> Option<UserProfile> {
    self
      .sessions
      .read()
      .await
      .get(&user_id)
      .map(|session| session.profile.clone())
  }

  fn send_targeted(&self, user_id: Uuid, output: Output) {
    if self.output_sender.receiver_count() > 0 {
      if let Err(err) = self.output_sender.send(OutputParcel::new(user_id, output)) {
        warn!("dropping output parcel: {}", err);
      }
    }
  }

  fn send_error(&self, user_id: Uuid, error: OutputError) {
    self.send_targeted(user_id, Output::Error(error));
  }

  fn report_store_error(&self, user_id: Uuid, err: &StoreError) {
    error!("store operation failed: {}", err);
    let output = match err {
      StoreError::NotFound(_) => OutputError::RoomNotFound,
      StoreError::Full(_) => OutputError::RoomFull,
      StoreError::Unavailable(_) => OutputError::StoreUnavailable,
    };
    self.send_error(user_id, output);
  }
}
