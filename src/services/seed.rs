//! Store seeding policy. Kept apart from generation so tests can start from a
//! fixed or empty store.

use crate::models::room::{RoomDto, RoomId};
use crate::services::generator::RoomGenerator;

pub const DEFAULT_ROOM_COUNT: usize = 50;

#[derive(Debug, Clone)]
pub enum Seed {
    Empty,
    /// `count` generated rooms with ids `1..=count`. `seed` fixes the RNG.
    Generated { count: usize, seed: Option<u64> },
    Fixed(Vec<RoomDto>),
}

impl Default for Seed {
    fn default() -> Self {
        Seed::Generated {
            count: DEFAULT_ROOM_COUNT,
            seed: None,
        }
    }
}

impl Seed {
    pub fn into_rooms(self) -> Vec<RoomDto> {
        match self {
            Seed::Empty => Vec::new(),
            Seed::Fixed(rooms) => rooms,
            Seed::Generated { count, seed } => {
                let mut generator = match seed {
                    Some(s) => RoomGenerator::from_seed(s),
                    None => RoomGenerator::from_entropy(),
                };
                (1..=count as i64)
                    .map(|id| generator.generate_room(RoomId(id)))
                    .collect()
            }
        }
    }
}
