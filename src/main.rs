pub mod models {
    pub mod command;
    pub mod room;
}

pub mod cli;
pub mod client;
pub mod config;
pub mod env_file;
pub mod state;
pub mod store;
pub mod utils;
pub mod services {
    pub mod generator;
    pub mod local;
    pub mod room_client;
    pub mod seed;
}

use crate::cli::Command;
use crate::client::{HttpRoomApi, RoomApi};
use crate::config::Config;
use crate::models::command::{RoomCommand, slider_target};
use crate::models::room::RoomDto;
use crate::services::local::LocalRoomApi;
use crate::services::room_client::{Completion, RoomClient};
use crate::state::CurrentRoom;
use crate::store::RoomStore;
use crate::utils::{format_temperature, serde_enum_name};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn run(command: Command) -> Result<(), String> {
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (api={}, seed_room_count={}, seed={}, wait_timeout={}s)",
        cfg.api_base_url.as_deref().unwrap_or("local"),
        cfg.seed_room_count,
        cfg.seed.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        cfg.wait_timeout.as_secs()
    );

    match &cfg.api_base_url {
        Some(url) => {
            info!("Using rooms service at {}", url);
            execute(RoomClient::new(HttpRoomApi::new(url)), command, cfg.wait_timeout)
        }
        None => {
            let store = RoomStore::seeded(cfg.seed_policy());
            info!("Using local store with {} room(s)", store.len());
            execute(RoomClient::new(LocalRoomApi::new(store)), command, cfg.wait_timeout)
        }
    }
}

fn execute<A: RoomApi>(client: RoomClient<A>, command: Command, wait: Duration) -> Result<(), String> {
    match command {
        Command::List => {
            let cell = client.rooms_cell();
            let seen = cell.version();
            client.load_all();
            let (_, list) = cell
                .wait_newer(seen, wait)
                .ok_or_else(|| "timed out waiting for room list".to_string())?;
            if let Some(err) = list.error {
                return Err(format!("failed to fetch rooms: {}", err));
            }
            for room in &list.rooms {
                print_summary(room);
            }
            info!("Listed {} room(s)", list.rooms.len());
            Ok(())
        }
        Command::Show(token) => {
            client.find(&token).wait();
            match client.current_room() {
                CurrentRoom::Loaded(room) => {
                    print_detail(&room);
                    Ok(())
                }
                CurrentRoom::Empty => Err(format!("no room matches {:?}", token)),
                CurrentRoom::NotFound(id) => Err(format!("room {} not found", id)),
                CurrentRoom::Failed(e) => Err(format!("lookup failed: {}", e)),
            }
        }
        Command::Create(form) => {
            let command = form.into_command().map_err(|e| e.to_string())?;
            match client.create(command).wait() {
                Completion::Failed(e) => Err(format!("create failed: {}", e)),
                _ => {
                    let room = client
                        .current_room()
                        .room()
                        .cloned()
                        .ok_or_else(|| "create did not return a room".to_string())?;
                    print_detail(&room);
                    Ok(())
                }
            }
        }
        Command::Update { id, name, target } => {
            client.load_one(id).wait();
            let mut room = match client.current_room() {
                CurrentRoom::Loaded(room) => room,
                CurrentRoom::NotFound(id) => return Err(format!("room {} not found", id)),
                other => return Err(format!("could not load room {}: {:?}", id, other)),
            };
            if let Some(name) = name {
                room.name = name;
            }
            if let Some(target) = target {
                let clamped = slider_target(target);
                if clamped != target {
                    warn!("Target {} outside slider range, using {}", target, clamped);
                }
                room.target_temperature = Some(clamped);
            }
            let preview = RoomCommand::for_update(&room).map_err(|e| e.to_string())?;
            info!(
                "Updating room {} (name={:?}, target={})",
                id,
                preview.name,
                format_temperature(preview.target_temperature)
            );
            client.save(id, &room).map_err(|e| e.to_string())?.wait();
            match client.current_room() {
                CurrentRoom::Loaded(room) => {
                    print_detail(&room);
                    Ok(())
                }
                CurrentRoom::NotFound(id) => Err(format!("room {} not found", id)),
                other => Err(format!("update failed: {:?}", other)),
            }
        }
        Command::Delete(id) => match client.remove(id).wait() {
            Completion::Failed(e) => Err(format!("delete failed: {}", e)),
            _ => {
                println!("Room {} deleted", id);
                Ok(())
            }
        },
    }
}

fn print_summary(room: &RoomDto) {
    println!(
        "{:>5}  {:<24} {:>8} -> {:>8}  ({} window(s))",
        room.id.0,
        room.name,
        format_temperature(room.current_temperature),
        format_temperature(room.target_temperature),
        room.windows.len()
    );
}

fn print_detail(room: &RoomDto) {
    println!("Room {}: {}", room.id, room.name);
    println!("  current: {}", format_temperature(room.current_temperature));
    println!("  target:  {}", format_temperature(room.target_temperature));
    for window in &room.windows {
        println!(
            "  window {:>2}  {:<22} {}",
            window.id.0,
            window.name,
            serde_enum_name(&window.window_status).unwrap_or_default()
        );
    }
}

fn load_env(explicit: Option<PathBuf>) -> Result<Option<(PathBuf, bool)>, String> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        env_file::load(&path)?;
        return Ok(Some((path, true)));
    }

    let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
    let default_path = cwd.join(".env");
    if default_path.is_file() {
        env_file::load(&default_path)?;
        Ok(Some((default_path, false)))
    } else {
        Ok(None)
    }
}

fn describe_env(path: &Path, explicit: bool) -> String {
    let origin = if explicit { "CLI-specified" } else { "default" };
    format!("{} .env file: {}", origin, path.display())
}

fn main() {
    let (command, loaded_env) = match cli::parse(std::env::args_os().skip(1))
        .and_then(|cli| load_env(cli.env_file).map(|env| (cli.command, env)))
    {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some((path, explicit)) = loaded_env.as_ref() {
        info!("Environment loaded from {}", describe_env(path, *explicit));
    }

    info!(
        "automacorp-rooms {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run(command) {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
