//! Command-line parsing.
//!
//! ```text
//! automacorp-rooms [--env-file PATH] [list]
//! automacorp-rooms [--env-file PATH] show <name-or-id>
//! automacorp-rooms [--env-file PATH] create --name N --current C --target T
//! automacorp-rooms [--env-file PATH] update <id> [--name N] [--target T]
//! automacorp-rooms [--env-file PATH] delete <id>
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use crate::models::command::NewRoomForm;
use crate::models::room::RoomId;

#[derive(Debug, Clone)]
pub enum Command {
    List,
    Show(String),
    Create(NewRoomForm),
    Update {
        id: RoomId,
        name: Option<String>,
        target: Option<f64>,
    },
    Delete(RoomId),
}

#[derive(Debug, Clone)]
pub struct Cli {
    pub env_file: Option<PathBuf>,
    pub command: Command,
}

pub fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Cli, String> {
    let mut env_file: Option<PathBuf> = None;
    let mut rest: Vec<String> = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg
            .into_string()
            .map_err(|_| "argument contains invalid UTF-8".to_string())?;
        if arg == "--env-file" || arg.starts_with("--env-file=") {
            if env_file.is_some() {
                return Err("`--env-file` provided more than once".to_string());
            }
            let value = match arg.strip_prefix("--env-file=") {
                Some(v) => v.to_string(),
                None => args
                    .next()
                    .and_then(|v| v.into_string().ok())
                    .ok_or_else(|| "`--env-file` requires a path argument".to_string())?,
            };
            if value.is_empty() {
                return Err("`--env-file` requires a path argument".to_string());
            }
            env_file = Some(PathBuf::from(value));
        } else {
            rest.push(arg);
        }
    }

    Ok(Cli {
        env_file,
        command: parse_command(&rest)?,
    })
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let Some((name, tail)) = args.split_first() else {
        return Ok(Command::List);
    };
    match name.as_str() {
        "list" => {
            no_extra(tail)?;
            Ok(Command::List)
        }
        "show" => match tail {
            [token] => Ok(Command::Show(token.clone())),
            _ => Err("usage: show <name-or-id>".to_string()),
        },
        "create" => {
            let flags = Flags::parse(tail, &["--name", "--current", "--target"])?;
            Ok(Command::Create(NewRoomForm {
                name: flags.get("--name").unwrap_or_default(),
                current_temperature: flags.get("--current").unwrap_or_default(),
                target_temperature: flags.get("--target").unwrap_or_default(),
            }))
        }
        "update" => {
            let (id, tail) = tail
                .split_first()
                .ok_or_else(|| "usage: update <id> [--name N] [--target T]".to_string())?;
            let id = parse_id(id)?;
            let flags = Flags::parse(tail, &["--name", "--target"])?;
            let target = flags
                .get("--target")
                .map(|t| {
                    t.trim()
                        .parse::<f64>()
                        .map_err(|_| format!("invalid target temperature: {}", t))
                })
                .transpose()?;
            Ok(Command::Update {
                id,
                name: flags.get("--name"),
                target,
            })
        }
        "delete" => match tail {
            [id] => Ok(Command::Delete(parse_id(id)?)),
            _ => Err("usage: delete <id>".to_string()),
        },
        "--" => parse_command(tail),
        other => Err(format!("unrecognised argument: {}", other)),
    }
}

fn parse_id(raw: &str) -> Result<RoomId, String> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(RoomId)
        .ok_or_else(|| format!("invalid room id: {}", raw))
}

fn no_extra(tail: &[String]) -> Result<(), String> {
    match tail.first() {
        Some(extra) => Err(format!("unrecognised argument: {}", extra)),
        None => Ok(()),
    }
}

struct Flags {
    values: Vec<(String, String)>,
}

impl Flags {
    fn parse(args: &[String], allowed: &[&str]) -> Result<Self, String> {
        let mut values: Vec<(String, String)> = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let (flag, value) = match arg.split_once('=') {
                Some((f, v)) => (f.to_string(), v.to_string()),
                None => {
                    let v = iter.next().ok_or_else(|| format!("`{}` requires a value", arg))?;
                    (arg.clone(), v.clone())
                }
            };
            if !allowed.contains(&flag.as_str()) {
                return Err(format!("unrecognised argument: {}", flag));
            }
            if values.iter().any(|(f, _)| *f == flag) {
                return Err(format!("`{}` provided more than once", flag));
            }
            values.push((flag, value));
        }
        Ok(Flags { values })
    }

    fn get(&self, flag: &str) -> Option<String> {
        self.values.iter().find(|(f, _)| f == flag).map(|(_, v)| v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_strs(args: &[&str]) -> Result<Cli, String> {
        parse(args.iter().map(OsString::from))
    }

    #[test]
    fn defaults_to_list() {
        let cli = parse_strs(&[]).expect("parses");
        assert!(cli.env_file.is_none());
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn env_file_in_either_form() {
        let cli = parse_strs(&["--env-file", "dev.env", "list"]).expect("parses");
        assert_eq!(cli.env_file, Some(PathBuf::from("dev.env")));
        let cli = parse_strs(&["show", "Lab", "--env-file=prod.env"]).expect("parses");
        assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
        assert!(matches!(cli.command, Command::Show(ref t) if t == "Lab"));

        assert!(parse_strs(&["--env-file"]).is_err());
        assert!(parse_strs(&["--env-file=a", "--env-file=b"]).is_err());
    }

    #[test]
    fn create_collects_form_fields() {
        let cli = parse_strs(&["create", "--name", "N1 Room", "--current=19", "--target", "21.5"]).expect("parses");
        match cli.command {
            Command::Create(form) => {
                assert_eq!(form.name, "N1 Room");
                assert_eq!(form.current_temperature, "19");
                assert_eq!(form.target_temperature, "21.5");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn update_takes_id_and_optional_flags() {
        let cli = parse_strs(&["update", "7", "--target", "21.27"]).expect("parses");
        match cli.command {
            Command::Update { id, name, target } => {
                assert_eq!(id, RoomId(7));
                assert_eq!(name, None);
                assert_eq!(target, Some(21.27));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_strs(&["update", "x"]).is_err());
        assert!(parse_strs(&["update", "7", "--target", "warm"]).is_err());
        assert!(parse_strs(&["update", "7", "--current", "20"]).is_err());
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(parse_strs(&["frobnicate"]).is_err());
        assert!(parse_strs(&["list", "extra"]).is_err());
        assert!(parse_strs(&["delete"]).is_err());
        assert!(parse_strs(&["delete", "0"]).is_err());
    }
}
