//! Configuration loader for TableTalk.
//!
//! Reads `config.toml` from the data directory (`~/.tabletalk/` in production)
//! and deserializes it into [`BotConfig`]. Falls back to defaults when the
//! file is missing or malformed -- the bot must come up even with no config,
//! since every field has a working default and secrets live in the
//! environment anyway.

use std::path::{Path, PathBuf};

use tabletalk_types::config::BotConfig;

/// Where TableTalk keeps its database and `config.toml`.
///
/// `TABLETALK_DATA_DIR` wins when set. Otherwise `~/.tabletalk`, falling
/// back to the working directory when there is no home (containers).
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var("TABLETALK_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => dirs::home_dir()
            .map(|home| home.join(".tabletalk"))
            .unwrap_or_else(|| PathBuf::from(".tabletalk")),
    }
}

/// Load bot configuration from `{data_dir}/config.toml`.
///
/// A missing file is the normal first-run case and yields the defaults. A
/// malformed file logs a warning and also yields the defaults rather than
/// refusing to start. A `PORT` environment variable (set by most hosting
/// platforms) overrides the configured server port either way.
pub async fn load_config(data_dir: &Path) -> BotConfig {
    let path = data_dir.join("config.toml");
    let config = read_config(&path).await.unwrap_or_default();
    apply_env_overrides(config)
}

async fn read_config(path: &Path) -> Option<BotConfig> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config.toml, starting from defaults");
            return None;
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "cannot read config.toml, starting from defaults"
            );
            return None;
        }
    };

    match toml::from_str(&raw) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "config.toml does not parse, starting from defaults"
            );
            None
        }
    }
}

fn apply_env_overrides(mut config: BotConfig) -> BotConfig {
    if let Ok(port) = std::env::var("PORT") {
        match port.parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!(value = %port, "PORT is not a number, keeping configured port"),
        }
    }
    config
}
