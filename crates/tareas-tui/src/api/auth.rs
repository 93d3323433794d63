use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Session token minted by the auth provider. Read from the environment
/// when set, otherwise from the config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
}

impl SessionToken {
    /// Get the path to the session token file
    fn token_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("tareas");

        fs::create_dir_all(&config_dir).context("Could not create config directory")?;

        Ok(config_dir.join("session.json"))
    }

    /// Load the token, preferring the TAREAS_SESSION_TOKEN variable
    pub fn load() -> Result<Option<Self>> {
        if let Ok(token) = std::env::var("TAREAS_SESSION_TOKEN") {
            if !token.is_empty() {
                return Ok(Some(Self { token }));
            }
        }

        let path = Self::token_path()?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).context("Could not read session file")?;
        let token: Self = serde_json::from_str(&contents).context("Could not parse session file")?;

        Ok(Some(token))
    }

    /// Save the token to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::token_path()?;
        let contents = serde_json::to_string_pretty(self).context("Could not serialize token")?;

        fs::write(&path, contents).context("Could not write session file")?;

        Ok(())
    }
}
