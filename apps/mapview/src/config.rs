use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{MapMode, DEFAULT_YEAR};

pub const DEFAULT_CONFIG_FILE: &str = "mapview.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub default_mode: MapMode,
    pub default_year: u16,
    pub map_center: [f64; 2],
    pub map_zoom: u8,
    pub tile_url: String,
    pub tile_attribution: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            default_mode: MapMode::Population,
            default_year: DEFAULT_YEAR,
            map_center: [41.3851, 2.1734],
            map_zoom: 13,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            tile_attribution: "&copy; OpenStreetMap contributors".into(),
        }
    }
}

impl Settings {
    /// Command-line override for the server url; normalized like the file and
    /// env values so a bare `host:port` still gets a scheme.
    pub fn with_server_url(mut self, raw: &str) -> Self {
        self.server_url = normalize_server_url(raw);
        self
    }
}

/// Reads `path` (or `mapview.toml` in the working directory when no path is
/// given), then applies environment overrides. An explicitly named file must
/// exist; the default one is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let raw = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    settings_from_sources(raw.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn settings_from_sources(
    raw_file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = match raw_file {
        Some(raw) => toml::from_str::<Settings>(raw).context("invalid mapview config")?,
        None => Settings::default(),
    };

    if let Some(v) = env("MAP_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("APP__DEFAULT_MODE") {
        settings.default_mode = v
            .parse()
            .with_context(|| format!("invalid APP__DEFAULT_MODE '{v}'"))?;
    }

    if let Some(v) = env("APP__DEFAULT_YEAR") {
        settings.default_year = v
            .trim()
            .parse()
            .with_context(|| format!("invalid APP__DEFAULT_YEAR '{v}'"))?;
    }

    settings.server_url = normalize_server_url(&settings.server_url);
    Ok(settings)
}

fn normalize_server_url(raw: &str) -> String {
    let raw = raw.trim().trim_end_matches('/');
    if raw.is_empty() {
        return Settings::default().server_url;
    }
    if raw.contains("://") {
        return raw.to_string();
    }
    format!("http://{raw}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
