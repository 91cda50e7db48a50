use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const PROFILE_FILE: &str = "profile.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player_name: Option<String>,
}

/// The single locally cached player name, persisted as `profile.json`.
#[derive(Debug)]
pub struct ProfileCache {
    path: PathBuf,
    player_name: Option<String>,
}

impl ProfileCache {
    /// A missing file is an empty profile. An unreadable one is logged and
    /// treated as empty so the player gets prompted again.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed creating data dir {}", data_dir.display()))?;
        let path = data_dir.join(PROFILE_FILE);

        let player_name = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<StoredProfile>(&bytes) {
                Ok(stored) => stored.player_name.filter(|name| !name.is_empty()),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "ignoring corrupt profile: {err}");
                    None
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                return Err(err).with_context(|| format!("failed reading {}", path.display()))
            }
        };

        Ok(Self { path, player_name })
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&mut self, name: &str) -> Result<()> {
        self.player_name = Some(name.to_string());
        self.persist()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.player_name = None;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let stored = StoredProfile {
            player_name: self.player_name.clone(),
        };
        let json = serde_json::to_vec_pretty(&stored).context("failed encoding profile")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed writing {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_profile_opens_empty() {
        let dir = TempDir::new().unwrap();
        let profile = ProfileCache::open(dir.path()).unwrap();
        assert_eq!(profile.player_name(), None);
        assert!(!profile.path().exists());
    }

    #[test]
    fn stored_name_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let mut profile = ProfileCache::open(dir.path()).unwrap();
        profile.store("Alice").unwrap();

        let reopened = ProfileCache::open(dir.path()).unwrap();
        assert_eq!(reopened.player_name(), Some("Alice"));

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join(PROFILE_FILE)).unwrap()).unwrap();
        assert_eq!(raw["playerName"], "Alice");
    }

    #[test]
    fn clear_forgets_the_name_on_disk() {
        let dir = TempDir::new().unwrap();
        let mut profile = ProfileCache::open(dir.path()).unwrap();
        profile.store("Alice").unwrap();
        profile.clear().unwrap();

        assert_eq!(profile.player_name(), None);
        assert_eq!(ProfileCache::open(dir.path()).unwrap().player_name(), None);
    }

    #[test]
    fn corrupt_profile_is_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROFILE_FILE), b"{not json").unwrap();
        let profile = ProfileCache::open(dir.path()).unwrap();
        assert_eq!(profile.player_name(), None);
    }
}
