//! Leaderboard HTTP client
//!
//! Talks JSON to the leaderboard backend:
//!
//! - `POST /register {username}` -> `{id, username}`
//! - `GET /leaderboard` -> `{leaderboard: [{username, score}, ...]}`
//! - `POST /update-leaderboard {username, score}`

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

const USER_AGENT: &str = "victors-descent";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    /// Server answered with a non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("bad response: {0}")]
    Decode(String),
}

/// A registered leaderboard user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub id: Option<String>,
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: i64,
}

/// The leaderboard backend, as seen by the game
pub trait LeaderboardApi: Send {
    fn register(&self, username: &str) -> Result<Registration, LeaderboardError>;
    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
    fn submit_score(&self, username: &str, score: u32) -> Result<(), LeaderboardError>;
}

/// Blocking HTTP implementation
pub struct HttpLeaderboard {
    base: String,
    agent: ureq::Agent,
}

impl HttpLeaderboard {
    pub fn new(base: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            base: base.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn send(&self, request: ureq::Request, body: Option<Value>) -> Result<Value, LeaderboardError> {
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(response) => {
                let text = response
                    .into_string()
                    .map_err(|e| LeaderboardError::Decode(e.to_string()))?;
                Ok(parse_body(&text))
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = parse_body(&response.into_string().unwrap_or_default());
                Err(LeaderboardError::Http {
                    status,
                    message: error_message(status, &body),
                })
            }
            Err(ureq::Error::Transport(t)) => Err(LeaderboardError::Transport(t.to_string())),
        }
    }
}

impl LeaderboardApi for HttpLeaderboard {
    fn register(&self, username: &str) -> Result<Registration, LeaderboardError> {
        let body = self.send(
            self.agent.post(&self.url("/register")),
            Some(json!({ "username": username })),
        )?;
        Ok(parse_registration(username, &body))
    }

    fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let body = self.send(self.agent.get(&self.url("/leaderboard")), None)?;
        Ok(parse_leaderboard(&body))
    }

    fn submit_score(&self, username: &str, score: u32) -> Result<(), LeaderboardError> {
        self.send(
            self.agent.post(&self.url("/update-leaderboard")),
            Some(json!({ "username": username, "score": score })),
        )?;
        Ok(())
    }
}

/// Response bodies that are empty or not JSON count as `{}`
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({}))
}

fn error_message(status: u16, body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Falls back to the requested name when the server does not echo one
fn parse_registration(requested: &str, body: &Value) -> Registration {
    let username = body
        .get("username")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(requested)
        .to_string();

    let id = match body.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Registration { username, id }
}

/// Anything other than an array of rows is an empty board
fn parse_leaderboard(body: &Value) -> Vec<LeaderboardEntry> {
    match body.get("leaderboard") {
        Some(Value::Array(rows)) => rows
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), json!({}));
        assert_eq!(parse_body("<html>oops</html>"), json!({}));
        assert_eq!(parse_body(r#"{"ok":true}"#), json!({"ok": true}));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(409, &json!({"error": "Username taken"})), "Username taken");
        assert_eq!(error_message(500, &json!({})), "HTTP 500");
    }

    #[test]
    fn test_parse_registration() {
        let reg = parse_registration("victor", &json!({"id": 12, "username": "Victor"}));
        assert_eq!(reg.username, "Victor");
        assert_eq!(reg.id.as_deref(), Some("12"));

        let reg = parse_registration("victor", &json!({"id": "abc"}));
        assert_eq!(reg.username, "victor");
        assert_eq!(reg.id.as_deref(), Some("abc"));

        let reg = parse_registration("victor", &json!({}));
        assert_eq!(reg, Registration { username: "victor".to_string(), id: None });
    }

    #[test]
    fn test_parse_leaderboard() {
        let rows = parse_leaderboard(&json!({
            "leaderboard": [
                {"username": "ana", "score": 114},
                {"username": "bo", "score": 64},
                {"bogus": true}
            ]
        }));
        assert_eq!(
            rows,
            vec![
                LeaderboardEntry { username: "ana".to_string(), score: 114 },
                LeaderboardEntry { username: "bo".to_string(), score: 64 },
            ]
        );

        assert!(parse_leaderboard(&json!({"leaderboard": "nope"})).is_empty());
        assert!(parse_leaderboard(&json!({})).is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpLeaderboard::new("http://localhost:3000/");
        assert_eq!(client.url("/leaderboard"), "http://localhost:3000/leaderboard");
    }
}
