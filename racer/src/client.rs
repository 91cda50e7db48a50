//! HTTP façade over the score service.
//!
//! Every call is a single request with no retry. Transport failures come back
//! as `Err`; known service outcomes (name taken, unknown player) are values.

use std::time::Duration;

use anyhow::{anyhow, Result};
use awc::{http::StatusCode, Client};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5170";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const NAME_TAKEN_MESSAGE: &str = "Player name already exists";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Registration {
    Registered,
    NameTaken,
    Rejected(String),
}

/// The three operations the game needs from the score service.
///
/// Implementations are driven from a single-threaded runtime, so their
/// futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait ScoreService {
    async fn register_player(&self, name: &str) -> Result<Registration>;
    /// `Ok(None)` when the service does not know the player.
    async fn fetch_high_score(&self, name: &str) -> Result<Option<i64>>;
    async fn submit_score(&self, name: &str, score: u32) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    player_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    player_name: &'a str,
    score: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HighScoreBody {
    high_score: i64,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Clone)]
pub struct HttpScoreClient {
    client: Client,
    base_url: String,
}

impl HttpScoreClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).finish(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl ScoreService for HttpScoreClient {
    async fn register_player(&self, name: &str) -> Result<Registration> {
        let mut response = self
            .client
            .post(self.url("/players"))
            .send_json(&RegisterBody { player_name: name })
            .await
            .map_err(|e| anyhow!("register request failed: {e}"))?;
        let body = response
            .body()
            .await
            .map_err(|e| anyhow!("failed reading register response: {e}"))?;
        interpret_registration(response.status(), &body)
    }

    async fn fetch_high_score(&self, name: &str) -> Result<Option<i64>> {
        let path = format!(
            "/high-score/{}",
            utf8_percent_encode(name, NON_ALPHANUMERIC)
        );
        let mut response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| anyhow!("high score request failed: {e}"))?;
        let body = response
            .body()
            .await
            .map_err(|e| anyhow!("failed reading high score response: {e}"))?;
        interpret_high_score(response.status(), &body)
    }

    async fn submit_score(&self, name: &str, score: u32) -> Result<()> {
        let mut response = self
            .client
            .post(self.url("/submit-score"))
            .send_json(&SubmitBody {
                player_name: name,
                score,
            })
            .await
            .map_err(|e| anyhow!("submit request failed: {e}"))?;
        let body = response
            .body()
            .await
            .map_err(|e| anyhow!("failed reading submit response: {e}"))?;
        interpret_submission(response.status(), &body)
    }
}

/// Error bodies are either `{"message": ...}` or a bare JSON string.
fn response_message(body: &[u8]) -> Option<String> {
    if let Ok(MessageBody { message }) = serde_json::from_slice(body) {
        return Some(message);
    }
    serde_json::from_slice::<String>(body).ok()
}

fn unexpected(status: StatusCode, body: &[u8]) -> anyhow::Error {
    match response_message(body) {
        Some(message) => anyhow!("score service returned {status}: {message}"),
        None => anyhow!("score service returned {status}"),
    }
}

pub(crate) fn interpret_registration(status: StatusCode, body: &[u8]) -> Result<Registration> {
    match status {
        StatusCode::OK => Ok(Registration::Registered),
        StatusCode::BAD_REQUEST => match response_message(body) {
            Some(message) if message == NAME_TAKEN_MESSAGE => Ok(Registration::NameTaken),
            Some(message) => Ok(Registration::Rejected(message)),
            None => Ok(Registration::Rejected(status.to_string())),
        },
        _ => Err(unexpected(status, body)),
    }
}

pub(crate) fn interpret_high_score(status: StatusCode, body: &[u8]) -> Result<Option<i64>> {
    match status {
        StatusCode::OK => {
            let parsed: HighScoreBody = serde_json::from_slice(body)
                .map_err(|e| anyhow!("malformed high score response: {e}"))?;
            Ok(Some(parsed.high_score))
        }
        StatusCode::NOT_FOUND => Ok(None),
        _ => Err(unexpected(status, body)),
    }
}

pub(crate) fn interpret_submission(status: StatusCode, body: &[u8]) -> Result<()> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(unexpected(status, body))
    }
}
