use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterPlayerRequest {
    #[serde(default)]
    pub(crate) player_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitScoreRequest {
    #[serde(default)]
    pub(crate) player_name: Option<String>,
    #[serde(default)]
    pub(crate) score: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HighScoreResponse {
    pub(crate) player_name: String,
    pub(crate) high_score: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) service: &'static str,
    pub(crate) players: usize,
    pub(crate) max_player_name_len: usize,
}
