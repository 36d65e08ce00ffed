//! Minimal runtime configuration helpers.
//! Without `ROOMS_API_URL` the binary runs against an in-process seeded store.

use std::time::Duration;

use crate::services::seed::{DEFAULT_ROOM_COUNT, Seed};

pub const DEFAULT_WAIT_SECS: u64 = 30;
pub const MAX_SEED_ROOM_COUNT: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the rooms REST service (e.g. "http://localhost:8080/api").
    pub api_base_url: Option<String>,
    /// Rooms generated for the local store.
    pub seed_room_count: usize,
    /// Fixed generator seed for reproducible local data.
    pub seed: Option<u64>,
    /// How long the CLI waits for a request to publish its result.
    pub wait_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let api_base_url = get("ROOMS_API_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if let Some(url) = &api_base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(format!("ROOMS_API_URL must be an http(s) URL, got {}", url));
        }

        let seed_room_count = match get("ROOM_SEED_COUNT") {
            Some(s) if !s.trim().is_empty() => s
                .trim()
                .parse::<usize>()
                .map_err(|_| "ROOM_SEED_COUNT must be a non-negative integer".to_string())?,
            _ => DEFAULT_ROOM_COUNT,
        };
        if seed_room_count > MAX_SEED_ROOM_COUNT {
            return Err(format!(
                "ROOM_SEED_COUNT must be at most {}, got {}",
                MAX_SEED_ROOM_COUNT, seed_room_count
            ));
        }

        let seed = match get("ROOM_SEED") {
            Some(s) if !s.trim().is_empty() => Some(
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| "ROOM_SEED must be an unsigned integer".to_string())?,
            ),
            _ => None,
        };

        let wait_secs = get("WAIT_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_WAIT_SECS);

        Ok(Config {
            api_base_url,
            seed_room_count,
            seed,
            wait_timeout: Duration::from_secs(wait_secs),
        })
    }

    pub fn seed_policy(&self) -> Seed {
        Seed::Generated {
            count: self.seed_room_count,
            seed: self.seed,
        }
    }
}
