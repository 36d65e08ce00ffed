//! Observable state shared between request workers and readers.
//!
//! A `StateCell` holds one value and a version number under a single lock, so a
//! reader always sees a value exactly as some writer published it. Subscribers
//! block on `wait_newer` until the version moves past what they last saw.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::models::room::{RoomDto, RoomId};

struct Versioned<T> {
    version: u64,
    value: T,
}

pub struct StateCell<T> {
    inner: Mutex<Versioned<T>>,
    changed: Condvar,
}

impl<T: Clone> StateCell<T> {
    pub fn new(value: T) -> Self {
        StateCell {
            inner: Mutex::new(Versioned { version: 0, value }),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Versioned<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn snapshot(&self) -> (u64, T) {
        let guard = self.lock();
        (guard.version, guard.value.clone())
    }

    /// Publish `value` and wake subscribers. Returns the new version.
    pub fn set(&self, value: T) -> u64 {
        let mut guard = self.lock();
        guard.version += 1;
        guard.value = value;
        self.changed.notify_all();
        guard.version
    }

    /// Publish only if `allowed()` holds; the check runs under the cell lock.
    pub fn set_if(&self, allowed: impl FnOnce() -> bool, value: T) -> bool {
        let mut guard = self.lock();
        if !allowed() {
            return false;
        }
        guard.version += 1;
        guard.value = value;
        self.changed.notify_all();
        true
    }

    /// Block until the version is greater than `seen`, or `timeout` elapses.
    pub fn wait_newer(&self, seen: u64, timeout: Duration) -> Option<(u64, T)> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock();
        while guard.version <= seen {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let (next, result) = self
                .changed
                .wait_timeout(guard, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            guard = next;
            if result.timed_out() && guard.version <= seen {
                return None;
            }
        }
        Some((guard.version, guard.value.clone()))
    }
}

/// Orders requests that publish into the same cell. Only the newest ticket may publish.
#[derive(Debug, Default)]
pub struct RequestSlot {
    issued: AtomicU64,
}

impl RequestSlot {
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }

    /// Retire every outstanding ticket.
    pub fn invalidate(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }
}

/// Room list as published to readers; list and error always come from the same request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomList {
    pub rooms: Vec<RoomDto>,
    pub error: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl RoomList {
    pub fn loaded(rooms: Vec<RoomDto>) -> Self {
        RoomList {
            rooms,
            error: None,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        RoomList {
            rooms: Vec::new(),
            error: Some(message.into()),
            fetched_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CurrentRoom {
    #[default]
    Empty,
    Loaded(RoomDto),
    NotFound(RoomId),
    Failed(String),
}

impl CurrentRoom {
    /// The room, when one is loaded. Every other state reads as absent.
    pub fn room(&self) -> Option<&RoomDto> {
        match self {
            CurrentRoom::Loaded(room) => Some(room),
            _ => None,
        }
    }
}
