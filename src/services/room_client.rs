//! Command and reconciliation layer between a UI and the rooms service.
//!
//! Every operation runs once on its own worker thread and publishes its result
//! into a shared `StateCell`. Callers never block unless they choose to wait on
//! the returned `Pending`. Requests that publish into the same cell are ordered
//! by ticket: a result is dropped when a newer request for that cell was issued
//! after it (or the slot was cancelled).

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::client::{RoomApi, RoomApiError};
use crate::models::command::{RoomCommand, ValidationError};
use crate::models::room::{RoomDto, RoomId};
use crate::state::{CurrentRoom, RequestSlot, RoomList, StateCell};

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The result was published.
    Applied,
    /// A newer request owned the state by the time this one finished.
    Superseded,
    /// The request failed. Any error state it owed has been published.
    Failed(RoomApiError),
    /// The worker never reported back.
    Lost,
}

enum PendingInner {
    Running(JoinHandle<Completion>),
    Ready(Completion),
}

/// Handle to an in-flight request. Dropping it detaches the request.
pub struct Pending {
    inner: PendingInner,
}

impl Pending {
    pub fn wait(self) -> Completion {
        match self.inner {
            PendingInner::Running(handle) => handle.join().unwrap_or(Completion::Lost),
            PendingInner::Ready(completion) => completion,
        }
    }
}

pub struct RoomClient<A: RoomApi> {
    api: Arc<A>,
    rooms: Arc<StateCell<RoomList>>,
    room: Arc<StateCell<CurrentRoom>>,
    list_slot: Arc<RequestSlot>,
    room_slot: Arc<RequestSlot>,
}

impl<A: RoomApi> RoomClient<A> {
    pub fn new(api: A) -> Self {
        RoomClient {
            api: Arc::new(api),
            rooms: Arc::new(StateCell::new(RoomList::default())),
            room: Arc::new(StateCell::new(CurrentRoom::Empty)),
            list_slot: Arc::new(RequestSlot::default()),
            room_slot: Arc::new(RequestSlot::default()),
        }
    }

    pub fn rooms(&self) -> RoomList {
        self.rooms.get()
    }

    pub fn current_room(&self) -> CurrentRoom {
        self.room.get()
    }

    pub fn rooms_cell(&self) -> Arc<StateCell<RoomList>> {
        Arc::clone(&self.rooms)
    }

    pub fn room_cell(&self) -> Arc<StateCell<CurrentRoom>> {
        Arc::clone(&self.room)
    }

    /// Fetch every room. Failure publishes an empty list carrying the error message.
    pub fn load_all(&self) -> Pending {
        let ticket = self.list_slot.issue();
        let api = Arc::clone(&self.api);
        let cell = Arc::clone(&self.rooms);
        let slot = Arc::clone(&self.list_slot);

        spawn_worker("load-all", move || {
            let (list, completion) = match api.list_rooms() {
                Ok(rooms) => {
                    debug!("Fetched {} room(s)", rooms.len());
                    (RoomList::loaded(rooms), Completion::Applied)
                }
                Err(e) => {
                    error!("Failed to fetch rooms: {}", e);
                    (RoomList::failed(e.to_string()), Completion::Failed(e))
                }
            };
            publish(&cell, &slot, ticket, list, completion)
        })
    }

    pub fn load_one(&self, id: RoomId) -> Pending {
        let api = Arc::clone(&self.api);
        self.run_for_room("load-one", move || {
            let result = api.get_room(id);
            room_outcome(id, result, "fetch")
        })
    }

    /// Resolve `token` as an id (digits only) or a name fragment. No match publishes `Empty`.
    pub fn find(&self, token: &str) -> Pending {
        let api = Arc::clone(&self.api);
        let token = token.to_string();
        self.run_for_room("find", move || match api.find_by_name_or_id(&token) {
            Ok(Some(room)) => (CurrentRoom::Loaded(room), Completion::Applied),
            Ok(None) => {
                debug!("No room matches {:?}", token);
                (CurrentRoom::Empty, Completion::Applied)
            }
            Err(e) => {
                error!("Failed to look up room {:?}: {}", token, e);
                (CurrentRoom::Failed(e.to_string()), Completion::Failed(e))
            }
        })
    }

    /// Send an edited room. The command is built before anything is sent, so a
    /// blank name is rejected here. Any failure leaves no room loaded.
    pub fn save(&self, id: RoomId, room: &RoomDto) -> Result<Pending, ValidationError> {
        let command = RoomCommand::for_update(room)?;
        let api = Arc::clone(&self.api);
        Ok(self.run_for_room("save", move || {
            let result = api.update_room(id, &command);
            if result.is_ok() {
                info!("Room {} updated", id);
            }
            room_outcome(id, result, "update")
        }))
    }

    /// Delete a room. Published state is left alone either way.
    pub fn remove(&self, id: RoomId) -> Pending {
        let api = Arc::clone(&self.api);
        spawn_worker("remove", move || match api.delete_room(id) {
            Ok(()) => {
                info!("Deleted room {}", id);
                Completion::Applied
            }
            Err(e) => {
                error!("Failed to delete room {}: {}", id, e);
                Completion::Failed(e)
            }
        })
    }

    /// Create a room and make it the current one. Failure leaves state unchanged.
    pub fn create(&self, command: RoomCommand) -> Pending {
        let ticket = self.room_slot.issue();
        let api = Arc::clone(&self.api);
        let cell = Arc::clone(&self.room);
        let slot = Arc::clone(&self.room_slot);

        spawn_worker("create", move || match api.create_room(&command) {
            Ok(room) => {
                info!("Created room {} ({})", room.id, room.name);
                publish(&cell, &slot, ticket, CurrentRoom::Loaded(room), Completion::Applied)
            }
            Err(e) => {
                error!("Failed to create room {:?}: {}", command.name, e);
                Completion::Failed(e)
            }
        })
    }

    /// Drop the results of every request still in flight.
    pub fn cancel_pending(&self) {
        self.list_slot.invalidate();
        self.room_slot.invalidate();
        debug!("Cancelled pending room requests");
    }

    fn run_for_room<F>(&self, label: &'static str, work: F) -> Pending
    where
        F: FnOnce() -> (CurrentRoom, Completion) + Send + 'static,
    {
        let ticket = self.room_slot.issue();
        let cell = Arc::clone(&self.room);
        let slot = Arc::clone(&self.room_slot);

        spawn_worker(label, move || {
            let (state, completion) = work();
            publish(&cell, &slot, ticket, state, completion)
        })
    }
}

fn room_outcome(id: RoomId, result: Result<RoomDto, RoomApiError>, action: &str) -> (CurrentRoom, Completion) {
    match result {
        Ok(room) => (CurrentRoom::Loaded(room), Completion::Applied),
        Err(RoomApiError::NotFound) => {
            warn!("Room {} not found on {}", id, action);
            (CurrentRoom::NotFound(id), Completion::Failed(RoomApiError::NotFound))
        }
        Err(e) => {
            error!("Failed to {} room {}: {}", action, id, e);
            (CurrentRoom::Failed(e.to_string()), Completion::Failed(e))
        }
    }
}

fn publish<T: Clone>(
    cell: &StateCell<T>,
    slot: &RequestSlot,
    ticket: u64,
    value: T,
    completion: Completion,
) -> Completion {
    if cell.set_if(|| slot.is_current(ticket), value) {
        completion
    } else {
        debug!("Dropping result of superseded request (ticket {})", ticket);
        Completion::Superseded
    }
}

fn spawn_worker<F>(label: &'static str, work: F) -> Pending
where
    F: FnOnce() -> Completion + Send + 'static,
{
    match thread::Builder::new().name(format!("room-client-{}", label)).spawn(work) {
        Ok(handle) => Pending {
            inner: PendingInner::Running(handle),
        },
        Err(e) => {
            error!("Could not start {} worker: {}", label, e);
            Pending {
                inner: PendingInner::Ready(Completion::Failed(RoomApiError::Transport(format!(
                    "worker thread unavailable: {}",
                    e
                )))),
            }
        }
    }
}
