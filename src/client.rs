//! HTTP client for the rooms REST service.
//!
//! - Blocking client using `ureq` (no async); callers put it on a worker thread.
//! - No retries and no custom timeouts: transport defaults apply.
//! - Response bodies are decoded through `serde_path_to_error` so a bad field is named.
//!
//! Endpoints
//! - `GET /rooms`, `GET /rooms/{id}`, `POST /rooms`, `PUT /rooms/{id}`, `DELETE /rooms/{id}`

use http::StatusCode;
use log::debug;
use serde::de::DeserializeOwned;

use crate::models::command::RoomCommand;
use crate::models::room::{RoomDto, RoomId};
use crate::utils::is_digits_only;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomApiError {
    /// The service answered 404 for the requested room.
    NotFound,
    Transport(String),
    Http { status: u16, message: String },
    Json(String),
}

impl RoomApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RoomApiError::NotFound)
    }
}

impl core::fmt::Display for RoomApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RoomApiError::NotFound => write!(f, "room not found"),
            RoomApiError::Transport(s) => write!(f, "transport error: {}", s),
            RoomApiError::Http { status, message } => write!(f, "http {}: {}", status, message),
            RoomApiError::Json(e) => write!(f, "json error: {}", e),
        }
    }
}

impl std::error::Error for RoomApiError {}

impl From<ureq::Error> for RoomApiError {
    fn from(value: ureq::Error) -> Self {
        RoomApiError::Transport(value.to_string())
    }
}

/// The remote rooms service as seen by the client layer.
pub trait RoomApi: Send + Sync + 'static {
    fn list_rooms(&self) -> Result<Vec<RoomDto>, RoomApiError>;

    fn get_room(&self, id: RoomId) -> Result<RoomDto, RoomApiError>;

    fn create_room(&self, command: &RoomCommand) -> Result<RoomDto, RoomApiError>;

    fn update_room(&self, id: RoomId, command: &RoomCommand) -> Result<RoomDto, RoomApiError>;

    fn delete_room(&self, id: RoomId) -> Result<(), RoomApiError>;

    /// Digits-only tokens are fetched by id; anything else matches the first
    /// listed room whose name contains it, ignoring case.
    fn find_by_name_or_id(&self, token: &str) -> Result<Option<RoomDto>, RoomApiError> {
        if token.is_empty() {
            return Ok(None);
        }
        if is_digits_only(token) {
            let Ok(id) = token.parse::<i64>() else {
                return Ok(None);
            };
            return match self.get_room(RoomId(id)) {
                Ok(room) => Ok(Some(room)),
                Err(RoomApiError::NotFound) => Ok(None),
                Err(e) => Err(e),
            };
        }
        let mut rooms = self.list_rooms()?;
        rooms.sort_by_key(|r| r.id);
        Ok(rooms.into_iter().find(|r| r.name_contains(token)))
    }
}

pub struct HttpRoomApi {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpRoomApi {
    pub fn new(base_url: &str) -> Self {
        let config = ureq::Agent::config_builder().http_status_as_error(false).build();
        Self::with_agent(base_url, config.into())
    }

    /// The agent must be built with `http_status_as_error(false)`.
    pub fn with_agent(base_url: &str, agent: ureq::Agent) -> Self {
        HttpRoomApi {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn read_json<T: DeserializeOwned>(res: http::Response<ureq::Body>) -> Result<T, RoomApiError> {
        let body = Self::read_success(res)?;
        let de = &mut serde_json::Deserializer::from_str(&body);
        serde_path_to_error::deserialize(de).map_err(|e| RoomApiError::Json(e.to_string()))
    }

    fn read_success(mut res: http::Response<ureq::Body>) -> Result<String, RoomApiError> {
        let status = res.status();
        let body = res.body_mut().read_to_string()?;
        if status.is_success() {
            return Ok(body);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(RoomApiError::NotFound);
        }
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("<no body>").to_string()
        } else {
            body
        };
        Err(RoomApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

impl RoomApi for HttpRoomApi {
    fn list_rooms(&self) -> Result<Vec<RoomDto>, RoomApiError> {
        let url = self.url("/rooms");
        debug!("GET {}", url);
        let res = self.agent.get(&url).header("Accept", "application/json").call()?;
        Self::read_json(res)
    }

    fn get_room(&self, id: RoomId) -> Result<RoomDto, RoomApiError> {
        let url = self.url(&format!("/rooms/{}", id));
        debug!("GET {}", url);
        let res = self.agent.get(&url).header("Accept", "application/json").call()?;
        Self::read_json(res)
    }

    fn create_room(&self, command: &RoomCommand) -> Result<RoomDto, RoomApiError> {
        let url = self.url("/rooms");
        debug!("POST {}", url);
        let res = self
            .agent
            .post(&url)
            .header("Accept", "application/json")
            .send_json(command)?;
        Self::read_json(res)
    }

    fn update_room(&self, id: RoomId, command: &RoomCommand) -> Result<RoomDto, RoomApiError> {
        let url = self.url(&format!("/rooms/{}", id));
        debug!("PUT {}", url);
        let res = self
            .agent
            .put(&url)
            .header("Accept", "application/json")
            .send_json(command)?;
        Self::read_json(res)
    }

    fn delete_room(&self, id: RoomId) -> Result<(), RoomApiError> {
        let url = self.url(&format!("/rooms/{}", id));
        debug!("DELETE {}", url);
        let res = self.agent.delete(&url).call()?;
        Self::read_success(res).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answer exactly one request with a canned response; yields the raw request text.
    fn serve_once(status: &'static str, body: &'static str) -> (HttpRoomApi, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).expect("write");
            stream.flush().expect("flush");
            request
        });

        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .proxy(None)
            .build();
        let api = HttpRoomApi::with_agent(&format!("http://{}/", addr), config.into());
        (api, handle)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).expect("read");
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let headers = text[..header_end].to_ascii_lowercase();
        let body = &text[header_end + 4..];
        if headers.contains("transfer-encoding: chunked") {
            return body.ends_with("0\r\n\r\n");
        }
        let length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    #[test]
    fn lists_rooms() {
        let (api, server) = serve_once(
            "200 OK",
            r#"[{"id":2,"name":"A2 Room","currentTemperature":19.0,"windows":[]}]"#,
        );
        let rooms = api.list_rooms().expect("rooms");
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id, RoomId(2));
        assert_eq!(rooms[0].target_temperature, None);

        let request = server.join().expect("server");
        assert!(request.starts_with("GET /rooms "), "{}", request);
    }

    #[test]
    fn missing_room_is_not_found() {
        let (api, server) = serve_once("404 Not Found", "");
        assert_eq!(api.get_room(RoomId(999)), Err(RoomApiError::NotFound));
        let request = server.join().expect("server");
        assert!(request.starts_with("GET /rooms/999 "), "{}", request);
    }

    #[test]
    fn server_error_keeps_status_and_body() {
        let (api, server) = serve_once("500 Internal Server Error", "boom");
        let err = api.list_rooms().expect_err("should fail");
        assert_eq!(
            err,
            RoomApiError::Http {
                status: 500,
                message: "boom".to_string()
            }
        );
        assert!(!err.is_not_found());
        server.join().expect("server");
    }

    #[test]
    fn bad_body_names_the_field() {
        let (api, server) = serve_once("200 OK", r#"{"id":1,"name":"A1 Room","windows":[{"id":1}]}"#);
        match api.get_room(RoomId(1)) {
            Err(RoomApiError::Json(message)) => assert!(message.contains("windows[0]"), "{}", message),
            other => panic!("expected json error, got {:?}", other),
        }
        server.join().expect("server");
    }

    #[test]
    fn update_sends_command_body() {
        let (api, server) = serve_once(
            "200 OK",
            r#"{"id":4,"name":"D4 Office","currentTemperature":22.0,"targetTemperature":21.3,"windows":[]}"#,
        );
        let command = RoomCommand::new("D4 Office", Some(22.0), Some(21.3)).expect("valid");
        let room = api.update_room(RoomId(4), &command).expect("updated");
        assert_eq!(room.target_temperature, Some(21.3));

        let request = server.join().expect("server");
        assert!(request.starts_with("PUT /rooms/4 "), "{}", request);
        assert!(request.contains(r#""targetTemperature":21.3"#), "{}", request);
    }

    #[test]
    fn delete_accepts_no_content() {
        let (api, server) = serve_once("204 No Content", "");
        api.delete_room(RoomId(8)).expect("deleted");
        let request = server.join().expect("server");
        assert!(request.starts_with("DELETE /rooms/8 "), "{}", request);
    }

    #[test]
    fn unreachable_service_is_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .proxy(None)
            .build();
        let api = HttpRoomApi::with_agent(&format!("http://{}", addr), config.into());
        match api.list_rooms() {
            Err(RoomApiError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
