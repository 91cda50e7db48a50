use std::{env, path::PathBuf, sync::Arc};

use crate::store::PlayerStore;

pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5170";
pub(crate) const DEFAULT_DATA_DIR: &str = "./data";
pub(crate) const DEFAULT_JSON_LIMIT_BYTES: usize = 16 * 1024;
pub(crate) const DEFAULT_MAX_PLAYER_NAME_LEN: usize = 64;

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) bind_addr: String,
    pub(crate) data_dir: PathBuf,
    pub(crate) json_limit_bytes: usize,
    pub(crate) max_player_name_len: usize,
}

impl ServerConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            bind_addr: env::var("API_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            json_limit_bytes: read_env_usize("JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT_BYTES),
            max_player_name_len: read_env_usize("MAX_PLAYER_NAME_LEN", DEFAULT_MAX_PLAYER_NAME_LEN),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) players: Arc<PlayerStore>,
    pub(crate) max_player_name_len: usize,
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
