use actix_web::{
    http::StatusCode,
    web::{Data, Json, Path},
    HttpResponse, Responder,
};

use crate::config::AppState;
use crate::response::{json_message, json_text};
use crate::store::{RegisterOutcome, SubmitOutcome};
use crate::types::{HealthResponse, HighScoreResponse, RegisterPlayerRequest, SubmitScoreRequest};

pub(crate) const WELCOME_TEXT: &str = "Welcome to the Hurdle Racer API!";

pub(crate) const MSG_REGISTERED: &str = "New player registered successfully";
pub(crate) const MSG_NAME_TAKEN: &str = "Player name already exists";
pub(crate) const MSG_NAME_REQUIRED: &str = "Player name is required";
pub(crate) const MSG_NAME_TOO_LONG: &str = "Player name is too long";
pub(crate) const MSG_PLAYER_NOT_FOUND: &str = "Player not found.";
pub(crate) const MSG_INVALID_SCORE: &str = "Invalid score data.";
pub(crate) const MSG_SCORE_SUBMITTED: &str = "Score submitted";

fn store_error(context: &str, player: &str, err: String) -> HttpResponse {
    tracing::error!(player, "{context} failed: {err}");
    json_message(StatusCode::INTERNAL_SERVER_ERROR, "player store error")
}

/// Accepts a non-empty name of at most `max_len` characters.
pub(crate) fn validate_player_name(
    name: Option<&str>,
    max_len: usize,
) -> Result<&str, &'static str> {
    let name = name.filter(|name| !name.is_empty()).ok_or(MSG_NAME_REQUIRED)?;
    if name.chars().count() > max_len {
        return Err(MSG_NAME_TOO_LONG);
    }
    Ok(name)
}

pub(crate) async fn root() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(WELCOME_TEXT)
}

pub(crate) async fn health(state: Data<AppState>) -> impl Responder {
    match state.players.count() {
        Ok(players) => HttpResponse::Ok().json(HealthResponse {
            status: "healthy",
            service: "hurdle-racer-score-api",
            players,
            max_player_name_len: state.max_player_name_len,
        }),
        Err(e) => {
            tracing::error!("health check failed: {e}");
            json_message(StatusCode::INTERNAL_SERVER_ERROR, "player store error")
        }
    }
}

pub(crate) async fn register_player(
    state: Data<AppState>,
    body: Json<RegisterPlayerRequest>,
) -> impl Responder {
    let name = match validate_player_name(body.player_name.as_deref(), state.max_player_name_len) {
        Ok(name) => name,
        Err(text) => return json_text(StatusCode::BAD_REQUEST, text),
    };

    match state.players.register(name) {
        Ok(RegisterOutcome::Registered) => {
            tracing::info!(player = name, "registered player");
            json_message(StatusCode::OK, MSG_REGISTERED)
        }
        Ok(RegisterOutcome::AlreadyExists) => {
            tracing::debug!(player = name, "registration rejected: name taken");
            json_message(StatusCode::BAD_REQUEST, MSG_NAME_TAKEN)
        }
        Err(e) => store_error("register", name, e),
    }
}

pub(crate) async fn high_score(state: Data<AppState>, path: Path<String>) -> impl Responder {
    let player_name = path.into_inner();
    match state.players.get(&player_name) {
        Ok(Some(record)) => HttpResponse::Ok().json(HighScoreResponse {
            player_name: record.player_name,
            high_score: record.high_score,
        }),
        Ok(None) => json_message(StatusCode::NOT_FOUND, MSG_PLAYER_NOT_FOUND),
        Err(e) => store_error("get high score", &player_name, e),
    }
}

pub(crate) async fn submit_score(
    state: Data<AppState>,
    body: Json<SubmitScoreRequest>,
) -> impl Responder {
    let name = match body.player_name.as_deref() {
        Some(name) if !name.is_empty() && body.score >= 0 => name,
        _ => return json_text(StatusCode::BAD_REQUEST, MSG_INVALID_SCORE),
    };

    match state.players.submit_score(name, body.score) {
        Ok(SubmitOutcome::Raised { high_score }) => {
            tracing::info!(player = name, high_score, "new high score");
            json_message(StatusCode::OK, MSG_SCORE_SUBMITTED)
        }
        Ok(SubmitOutcome::Kept { high_score }) => {
            tracing::debug!(player = name, score = body.score, high_score, "score below high score");
            json_message(StatusCode::OK, MSG_SCORE_SUBMITTED)
        }
        Ok(SubmitOutcome::UnknownPlayer) => {
            json_message(StatusCode::NOT_FOUND, MSG_PLAYER_NOT_FOUND)
        }
        Err(e) => store_error("submit score", name, e),
    }
}
