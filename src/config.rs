use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::geometry::ViewMode;
use crate::theory::{ALL_KEYS, DEFAULT_KEY};

pub fn config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("octave-tui")
}

/// Startup settings. Sizes are in canvas units: one per column, two per row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub key:           String,
    pub mode:          ViewMode,
    pub circle_margin: f64,
    pub linear_margin: f64,
    pub note_radius:   f64,
    pub hit_width:     f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key:           DEFAULT_KEY.to_string(),
            mode:          ViewMode::Circle,
            circle_margin: 4.0,
            linear_margin: 4.0,
            note_radius:   2.0,
            hit_width:     2.0,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Self {
        Self::load_from(&config_dir().join("config.json"))
    }

    /// Missing file → defaults. Unreadable values are reported and replaced.
    pub fn load_from(path: &Path) -> Self {
        let mut config: Config = fs::read_to_string(path)
            .ok()
            .and_then(|s| {
                serde_json::from_str(&s)
                    .map_err(|e| warn!("[config] parse error {path:?}: {e}"))
                    .ok()
            })
            .unwrap_or_default();
        config.sanitize();
        config
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !ALL_KEYS.contains(&self.key.as_str()) {
            warn!("[config] unknown key {:?}, using {:?}", self.key, defaults.key);
            self.key = defaults.key;
        }
        let fix = |value: &mut f64, fallback: f64| {
            if !value.is_finite() || *value < 0.0 { *value = fallback; }
        };
        fix(&mut self.circle_margin, defaults.circle_margin);
        fix(&mut self.linear_margin, defaults.linear_margin);
        fix(&mut self.note_radius,   defaults.note_radius);
        fix(&mut self.hit_width,     defaults.hit_width);
    }
}
