// Detector configuration file: `KEY<TAB>VALUE` lines.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use hashbrown::HashMap;

/// Raw key/value pairs of a configuration file.
///
/// Lines starting with `#` and lines with fewer than two fields are skipped.
/// A repeated key keeps its last value.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap {
    entries: HashMap<String, String>,
}

impl ConfigMap {
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            if let (Some(key), Some(value)) = (fields.next(), fields.next()) {
                entries.insert(key.to_string(), value.to_string());
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Typed lookup. A missing key or an unparsable value yields `default`;
    /// the latter is logged.
    pub fn lookup<T: FromStr>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = raw, "invalid configuration value, using default");
                default
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Settings of the detector binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Binary model file (`MODEL_BIN_FILE`).
    pub model_path: PathBuf,
    /// Event index file (`MODEL_IDX_FILE`).
    pub index_path: PathBuf,
    /// Leading feature coefficients excluded from scoring (`STRIP_OFFSET`).
    pub strip_offset: usize,
    /// Event insertion penalty (`INSERT_PENALTY`).
    pub insert_penalty: f32,
    /// Background event symbol (`BCG_IDX`).
    pub background_event: u32,
    /// Background dwell in frames before events are reported (`BCG_DUR`).
    pub background_frames: i64,
    /// Frame shift of the feature frontend in milliseconds (`WND_SHIFT`).
    pub frame_shift_ms: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.bin"),
            index_path: PathBuf::from("model.idx"),
            strip_offset: 0,
            insert_penalty: -100.0,
            background_event: 1,
            background_frames: 10,
            frame_shift_ms: 10.0,
        }
    }
}

impl DetectorConfig {
    /// Build typed settings from `map`. Relative file paths are resolved
    /// against `base`, the directory holding the configuration file.
    pub fn from_map(map: &ConfigMap, base: &Path) -> Self {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| {
            let p = map.get(key).map(PathBuf::from).unwrap_or(default);
            if p.is_relative() { base.join(p) } else { p }
        };
        Self {
            model_path: path("MODEL_BIN_FILE", defaults.model_path),
            index_path: path("MODEL_IDX_FILE", defaults.index_path),
            strip_offset: map.lookup("STRIP_OFFSET", defaults.strip_offset),
            insert_penalty: map.lookup("INSERT_PENALTY", defaults.insert_penalty),
            background_event: map.lookup("BCG_IDX", defaults.background_event),
            background_frames: map.lookup("BCG_DUR", defaults.background_frames),
            frame_shift_ms: map.lookup("WND_SHIFT", defaults.frame_shift_ms),
        }
    }

    /// Parse configuration text that was read from `path`.
    pub fn parse(text: &str, path: &Path) -> Self {
        let base = path.parent().unwrap_or(Path::new(""));
        Self::from_map(&ConfigMap::parse(text), base)
    }
}
