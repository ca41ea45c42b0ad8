use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

const CONFIG_DIR_NAME: &str = "cmdlog";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOCAL_CONFIG_FILE: &str = "cmdlog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ws_url: String,
    pub log_level: String,
    pub clear_screen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:9001".into(),
            log_level: "info".into(),
            clear_screen: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    ws_url: Option<String>,
    log_level: Option<String>,
    clear_screen: Option<bool>,
}

pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(explicit_path, |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then the environment.
pub fn load_settings_with(
    explicit_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config_file(&env),
    };
    if let Some(path) = path {
        let file_cfg = read_file_settings(&path)?;
        if let Some(v) = file_cfg.ws_url {
            settings.ws_url = v;
        }
        if let Some(v) = file_cfg.log_level {
            settings.log_level = v;
        }
        if let Some(v) = file_cfg.clear_screen {
            settings.clear_screen = v;
        }
    }

    if let Some(v) = env("CMDLOG_WS_URL") {
        settings.ws_url = v;
    }
    if let Some(v) = env("APP__WS_URL") {
        settings.ws_url = v;
    }

    if let Some(v) = env("CMDLOG_LOG_LEVEL") {
        settings.log_level = v;
    }
    if let Some(v) = env("APP__LOG_LEVEL") {
        settings.log_level = v;
    }

    for key in ["CMDLOG_CLEAR_SCREEN", "APP__CLEAR_SCREEN"] {
        if let Some(v) = env(key) {
            settings.clear_screen = v
                .trim()
                .parse::<bool>()
                .with_context(|| format!("invalid {key} '{v}': expected true or false"))?;
        }
    }

    Ok(settings)
}

/// `$HOME/.config` takes precedence over `$XDG_CONFIG_HOME`, which takes
/// precedence over the working directory.
fn discover_config_file(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = env("HOME") {
        candidates.push(
            Path::new(&home)
                .join(".config")
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }
    if let Some(dir) = env("XDG_CONFIG_HOME") {
        candidates.push(Path::new(&dir).join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    candidates.push(PathBuf::from(LOCAL_CONFIG_FILE));

    candidates.into_iter().find(|path| path.is_file())
}

fn read_file_settings(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))
}

/// Accepts `ws://`/`wss://` as is, maps `http(s)://` onto the matching
/// websocket scheme and treats a bare `host:port` as `ws://`.
pub fn normalize_ws_url(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    let candidate = if raw.is_empty() {
        Settings::default().ws_url
    } else if raw.starts_with("ws://") || raw.starts_with("wss://") {
        raw.to_string()
    } else if let Some(rest) = raw.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = raw.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if raw.contains("://") {
        bail!("unsupported websocket url '{raw}': expected ws://, wss://, http:// or https://");
    } else {
        format!("ws://{raw}")
    };

    let url = Url::parse(&candidate)
        .with_context(|| format!("invalid websocket url '{candidate}'"))?;
    if url.host_str().is_none() {
        bail!("websocket url '{candidate}' has no host");
    }
    Ok(url)
}
