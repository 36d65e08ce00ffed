//! Authoritative in-memory collection of rooms.
//!
//! Rooms are keyed by id. Name lookups scan in id order, so "first match" is
//! deterministic. Ids are handed out from a counter that only moves forward,
//! which keeps them unique even after deletions.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::models::command::RoomCommand;
use crate::models::room::{RoomDto, RoomId};
use crate::services::seed::Seed;
use crate::utils::is_digits_only;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(RoomId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "room with id {} not found", id),
        }
    }
}

impl Error for StoreError {}

#[derive(Debug)]
pub struct RoomStore {
    rooms: BTreeMap<RoomId, RoomDto>,
    next_id: i64,
}

impl Default for RoomStore {
    fn default() -> Self {
        RoomStore::new()
    }
}

impl RoomStore {
    pub fn new() -> Self {
        RoomStore {
            rooms: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn seeded(seed: Seed) -> Self {
        let mut store = RoomStore::new();
        for room in seed.into_rooms() {
            store.insert(room);
        }
        debug!("Room store seeded with {} room(s)", store.len());
        store
    }

    /// Insert or replace a full record, keeping the id counter ahead of it.
    pub fn insert(&mut self, room: RoomDto) {
        self.next_id = self.next_id.max(room.id.0.saturating_add(1));
        let id = room.id;
        if let Some(previous) = self.rooms.insert(id, room) {
            warn!("Room {} ({}) replaced by a record with the same id", id, previous.name);
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// All rooms ordered by name, ties by id.
    pub fn find_all(&self) -> Vec<RoomDto> {
        let mut rooms: Vec<RoomDto> = self.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        rooms
    }

    pub fn find_by_id(&self, id: RoomId) -> Option<RoomDto> {
        self.rooms.get(&id).cloned()
    }

    pub fn find_by_name(&self, name: &str) -> Option<RoomDto> {
        self.rooms.values().find(|r| r.name_contains(name)).cloned()
    }

    /// Digits-only tokens are ids, anything else is a name fragment.
    pub fn find_by_name_or_id(&self, token: Option<&str>) -> Option<RoomDto> {
        let token = token?;
        if token.is_empty() {
            return None;
        }
        if is_digits_only(token) {
            let id = token.parse::<i64>().ok()?;
            self.find_by_id(RoomId(id))
        } else {
            self.find_by_name(token)
        }
    }

    pub fn update_room(&mut self, id: RoomId, command: &RoomCommand) -> Result<RoomDto, StoreError> {
        let room = self.rooms.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        room.name = command.name.clone();
        room.current_temperature = command.current_temperature;
        room.target_temperature = command.target_temperature;
        Ok(room.clone())
    }

    pub fn create_room(&mut self, command: &RoomCommand) -> RoomDto {
        let room = RoomDto {
            id: RoomId(self.next_id),
            name: command.name.clone(),
            current_temperature: command.current_temperature,
            target_temperature: command.target_temperature,
            windows: Vec::new(),
        };
        self.insert(room.clone());
        room
    }

    /// Removes the room together with its windows.
    pub fn delete_room(&mut self, id: RoomId) -> Result<RoomDto, StoreError> {
        self.rooms.remove(&id).ok_or(StoreError::NotFound(id))
    }
}
