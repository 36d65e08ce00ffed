//! Wire models for the rooms REST boundary.
//!
//! Field names follow the service's camelCase JSON. Temperatures are in °C and
//! optional: an absent reading is not the same thing as zero.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

// =====================
// Scalar ID newtype wrappers
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub i64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i64);

impl Display for RoomId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for WindowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowStatus {
    Open,
    Closed,
}

impl WindowStatus {
    pub const ALL: [WindowStatus; 2] = [WindowStatus::Open, WindowStatus::Closed];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDto {
    pub id: WindowId,
    pub name: String,
    /// Owning room at creation time. Not kept in sync afterwards.
    pub room_id: RoomId,
    /// Copy of the room name taken when the window was generated; may go stale.
    pub room_name: String,
    pub window_status: WindowStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: RoomId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
    #[serde(default)]
    pub windows: Vec<WindowDto>,
}

impl RoomDto {
    /// Case-insensitive substring match on the room name.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}
