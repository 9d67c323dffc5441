use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use xspider_panel_core::ThemePreference;

pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8765";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const CWD_FILE: &str = ".xspider-panel.toml";

/// On-disk client preferences. Every field is optional so partial files
/// merge cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub engine: Option<EngineConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub url: Option<String>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Last theme preference the panel applied.
    pub theme: Option<String>,
}

/// Preferences after CLI, environment, file and defaults were layered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub engine_url: String,
    pub poll_interval: Duration,
    pub theme: ThemePreference,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            theme: ThemePreference::Dark,
        }
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub engine_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub theme: Option<ThemePreference>,
}

/// Platform config path: `<config_dir>/xspider-panel/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("xspider-panel").join("config.toml"))
}

/// Load preferences by cascading `./.xspider-panel.toml` over the platform
/// file. Values from the working directory win.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(CWD_FILE));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable preferences");
            None
        }
    }
}

/// Merge two files: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let engine = |f: &ConfigFile| f.engine.clone().unwrap_or_default();
    let display = |f: &ConfigFile| f.display.clone().unwrap_or_default();
    let (be, oe) = (engine(&base), engine(&overlay));
    let (bd, od) = (display(&base), display(&overlay));

    ConfigFile {
        engine: Some(EngineConfig {
            url: oe.url.or(be.url),
            poll_interval_ms: oe.poll_interval_ms.or(be.poll_interval_ms),
        }),
        display: Some(DisplayConfig {
            theme: od.theme.or(bd.theme),
        }),
    }
}

/// Layer `overrides` over `file` over the defaults.
pub fn resolve(file: &ConfigFile, overrides: &Overrides) -> Preferences {
    let mut prefs = Preferences::default();

    if let Some(engine) = &file.engine {
        if let Some(url) = engine.url.as_ref().filter(|u| !u.trim().is_empty()) {
            prefs.engine_url = url.trim().to_string();
        }
        if let Some(ms) = engine.poll_interval_ms {
            prefs.poll_interval = Duration::from_millis(ms.max(250));
        }
    }
    if let Some(theme) = file
        .display
        .as_ref()
        .and_then(|d| d.theme.as_deref())
        .and_then(|t| t.parse::<ThemePreference>().ok())
    {
        prefs.theme = theme;
    }

    if let Some(url) = &overrides.engine_url {
        prefs.engine_url = url.clone();
    }
    if let Some(ms) = overrides.poll_interval_ms {
        prefs.poll_interval = Duration::from_millis(ms.max(250));
    }
    if let Some(theme) = overrides.theme {
        prefs.theme = theme;
    }
    prefs
}

/// Record the applied theme preference in the file at `path`, keeping
/// everything else it holds.
pub fn save_theme(path: &Path, theme: ThemePreference) -> Result<PathBuf, String> {
    let mut cfg = load_from_path(path).unwrap_or_default();
    cfg.display
        .get_or_insert_with(DisplayConfig::default)
        .theme = Some(theme.as_str().to_string());
    save_config(path, &cfg)
}

pub fn save_config(path: &Path, config: &ConfigFile) -> Result<PathBuf, String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))?;
    Ok(path.to_path_buf())
}
