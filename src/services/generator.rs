//! Randomized room and window records for demos and tests.
//!
//! The generator owns its RNG so a fixed seed reproduces the same rooms.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::models::room::{RoomDto, RoomId, WindowDto, WindowId, WindowStatus};

pub const ROOM_KINDS: [&str; 5] = ["Room", "Meeting", "Laboratory", "Office", "Boardroom"];
pub const WINDOW_KINDS: [&str; 5] = ["Sliding", "Bay", "Casement", "Hung", "Fixed"];
pub const MAX_WINDOWS_PER_ROOM: i64 = 6;

const CURRENT_TEMP_RANGE: (i32, i32) = (15, 30);
const TARGET_TEMP_RANGE: (i32, i32) = (15, 22);

pub struct RoomGenerator {
    rng: SmallRng,
}

impl RoomGenerator {
    pub fn from_seed(seed: u64) -> Self {
        RoomGenerator {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        RoomGenerator {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// `"<Letter><id> <Kind>"` with 1 to 6 windows and whole-degree temperatures.
    pub fn generate_room(&mut self, id: RoomId) -> RoomDto {
        let letter = char::from(b'A' + self.rng.random_range(0..26u8));
        let kind = self.pick(&ROOM_KINDS);
        let name = format!("{}{} {}", letter, id.0, kind);

        let window_count = self.rng.random_range(1..=MAX_WINDOWS_PER_ROOM);
        let windows = (1..=window_count)
            .map(|n| self.generate_window(WindowId(n), id, &name))
            .collect();

        let current = self.rng.random_range(CURRENT_TEMP_RANGE.0..=CURRENT_TEMP_RANGE.1);
        let target = self.rng.random_range(TARGET_TEMP_RANGE.0..=TARGET_TEMP_RANGE.1);

        RoomDto {
            id,
            name,
            current_temperature: Some(f64::from(current)),
            target_temperature: Some(f64::from(target)),
            windows,
        }
    }

    pub fn generate_window(&mut self, id: WindowId, room_id: RoomId, room_name: &str) -> WindowDto {
        let kind = self.pick(&WINDOW_KINDS);
        let status = WindowStatus::ALL[self.rng.random_range(0..WindowStatus::ALL.len())];
        WindowDto {
            id,
            name: format!("{} Window {}", kind, id.0),
            room_id,
            room_name: room_name.to_string(),
            window_status: status,
        }
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options[self.rng.random_range(0..options.len())]
    }
}
