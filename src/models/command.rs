//! User-authored commands and the input checks that run before any request is sent.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use crate::models::room::RoomDto;

/// Slider bounds for the target temperature (°C). Only the input layer clamps to these.
pub const TARGET_TEMPERATURE_MIN: f64 = 10.0;
pub const TARGET_TEMPERATURE_MAX: f64 = 28.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty or whitespace only.
    BlankField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::BlankField(field) => write!(f, "{} is required", field),
        }
    }
}

impl Error for ValidationError {}

/// Body of `POST /rooms` and `PUT /rooms/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCommand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
}

impl RoomCommand {
    pub fn new(
        name: impl Into<String>,
        current_temperature: Option<f64>,
        target_temperature: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::BlankField("name"));
        }
        Ok(RoomCommand {
            name,
            current_temperature,
            target_temperature,
        })
    }

    /// Update command for an edited room: current temperature passes through, target is rounded.
    pub fn for_update(room: &RoomDto) -> Result<Self, ValidationError> {
        RoomCommand::new(
            room.name.clone(),
            room.current_temperature,
            room.target_temperature.map(round_target),
        )
    }
}

/// Raw text of the "new room" form.
#[derive(Debug, Clone, Default)]
pub struct NewRoomForm {
    pub name: String,
    pub current_temperature: String,
    pub target_temperature: String,
}

impl NewRoomForm {
    /// All three fields must be filled in; temperatures that do not parse are sent as absent.
    pub fn into_command(self) -> Result<RoomCommand, ValidationError> {
        let required = [
            ("name", &self.name),
            ("current temperature", &self.current_temperature),
            ("target temperature", &self.target_temperature),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ValidationError::BlankField(*field));
        }

        let current = parse_temperature(&self.current_temperature);
        let target = parse_temperature(&self.target_temperature);
        RoomCommand::new(self.name, current, target)
    }
}

fn parse_temperature(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round half-up to one decimal place.
pub fn round_target(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Clamp a requested target to the slider range.
pub fn slider_target(value: f64) -> f64 {
    value.clamp(TARGET_TEMPERATURE_MIN, TARGET_TEMPERATURE_MAX)
}
