//! `RoomApi` served from an in-process store, for running without a remote service.

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::{RoomApi, RoomApiError};
use crate::models::command::RoomCommand;
use crate::models::room::{RoomDto, RoomId};
use crate::store::{RoomStore, StoreError};

#[derive(Clone)]
pub struct LocalRoomApi {
    store: Arc<Mutex<RoomStore>>,
}

impl From<StoreError> for RoomApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => RoomApiError::NotFound,
        }
    }
}

impl LocalRoomApi {
    pub fn new(store: RoomStore) -> Self {
        LocalRoomApi {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RoomStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RoomApi for LocalRoomApi {
    fn list_rooms(&self) -> Result<Vec<RoomDto>, RoomApiError> {
        Ok(self.lock().find_all())
    }

    fn get_room(&self, id: RoomId) -> Result<RoomDto, RoomApiError> {
        self.lock().find_by_id(id).ok_or(RoomApiError::NotFound)
    }

    fn create_room(&self, command: &RoomCommand) -> Result<RoomDto, RoomApiError> {
        let room = self.lock().create_room(command);
        debug!("Local store created room {} ({})", room.id, room.name);
        Ok(room)
    }

    fn update_room(&self, id: RoomId, command: &RoomCommand) -> Result<RoomDto, RoomApiError> {
        Ok(self.lock().update_room(id, command)?)
    }

    fn delete_room(&self, id: RoomId) -> Result<(), RoomApiError> {
        let removed = self.lock().delete_room(id)?;
        debug!("Local store deleted room {} with {} window(s)", id, removed.windows.len());
        Ok(())
    }

    fn find_by_name_or_id(&self, token: &str) -> Result<Option<RoomDto>, RoomApiError> {
        Ok(self.lock().find_by_name_or_id(Some(token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::seed::Seed;

    fn api() -> LocalRoomApi {
        LocalRoomApi::new(RoomStore::seeded(Seed::Generated { count: 5, seed: Some(1) }))
    }

    #[test]
    fn missing_room_maps_to_not_found() {
        let api = api();
        assert_eq!(api.get_room(RoomId(999)), Err(RoomApiError::NotFound));
        let command = RoomCommand::new("X", None, None).expect("valid");
        assert_eq!(api.update_room(RoomId(999), &command), Err(RoomApiError::NotFound));
        assert_eq!(api.delete_room(RoomId(999)), Err(RoomApiError::NotFound));
    }

    #[test]
    fn create_then_fetch() {
        let api = api();
        let command = RoomCommand::new("N6 Office", Some(17.0), Some(20.0)).expect("valid");
        let created = api.create_room(&command).expect("created");
        assert_eq!(created.id, RoomId(6));

        let fetched = api.get_room(created.id).expect("fetched");
        assert_eq!(fetched.name, "N6 Office");
        assert_eq!(fetched.current_temperature, Some(17.0));
        assert_eq!(fetched.target_temperature, Some(20.0));
    }

    #[test]
    fn lookup_goes_through_the_store() {
        let api = api();
        let third = api.get_room(RoomId(3)).expect("present");
        assert_eq!(api.find_by_name_or_id("3"), Ok(Some(third.clone())));
        assert_eq!(api.find_by_name_or_id(&third.name.to_lowercase()), Ok(Some(third)));
        assert_eq!(api.find_by_name_or_id("no such room"), Ok(None));
    }

    #[test]
    fn default_lookup_matches_store_lookup() {
        struct ListOnly(LocalRoomApi);

        impl RoomApi for ListOnly {
            fn list_rooms(&self) -> Result<Vec<RoomDto>, RoomApiError> {
                self.0.list_rooms()
            }
            fn get_room(&self, id: RoomId) -> Result<RoomDto, RoomApiError> {
                self.0.get_room(id)
            }
            fn create_room(&self, command: &RoomCommand) -> Result<RoomDto, RoomApiError> {
                self.0.create_room(command)
            }
            fn update_room(&self, id: RoomId, command: &RoomCommand) -> Result<RoomDto, RoomApiError> {
                self.0.update_room(id, command)
            }
            fn delete_room(&self, id: RoomId) -> Result<(), RoomApiError> {
                self.0.delete_room(id)
            }
        }

        let local = api();
        let remote = ListOnly(local.clone());
        for token in ["1", "4", "99", "room", "office", "lab", "a", "", "3 ", " ", " 4"] {
            assert_eq!(remote.find_by_name_or_id(token), local.find_by_name_or_id(token), "token {:?}", token);
        }
    }
}
