use std::ffi::OsString;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use brawl_engine::{LoopConfig, MAX_BACKGROUND_RADIUS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const CONFIG_ENV_VAR: &str = "BRAWL_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "game.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) target_tps: u32,
    pub(crate) camera_zoom: f32,
    pub(crate) camera_follow_rate: f32,
    pub(crate) mob_count: usize,
    pub(crate) mob_spawn_half_extent: i32,
    pub(crate) tile_radius_x: i32,
    pub(crate) tile_radius_y: i32,
    pub(crate) rng_seed: Option<u64>,
    pub(crate) max_render_fps: Option<u32>,
    pub(crate) debug_bounds: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 450,
            target_tps: 60,
            camera_zoom: 2.0,
            camera_follow_rate: 15.0,
            mob_count: 10,
            mob_spawn_half_extent: 200,
            tile_radius_x: 40,
            tile_radius_y: 30,
            rng_seed: None,
            max_render_fps: None,
            debug_bounds: false,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config '{path}' at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config '{path}' at {field}: {message}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl GameConfig {
    /// Loads the config named by `BRAWL_CONFIG`, else `<config_dir>/game.json`
    /// when present, else the defaults.
    pub(crate) fn load(config_dir: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match resolve_config_path(std::env::var_os(CONFIG_ENV_VAR), config_dir) {
            Some(path) => {
                let config = Self::load_file(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    pub(crate) fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(path, &raw)
    }

    pub(crate) fn from_json_str(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config = serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer)
            .map_err(|error| {
                let field = error.path().to_string();
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    field: if field.is_empty() { ".".to_string() } else { field },
                    source: error.into_inner(),
                }
            })?;
        deserializer.end().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            field: ".".to_string(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, expected: &str, actual: &dyn Display| {
            Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                field,
                message: format!("expected {expected}, got {actual}"),
            })
        };
        if self.window_width == 0 {
            return invalid("window_width", "a positive width", &self.window_width);
        }
        if self.window_height == 0 {
            return invalid("window_height", "a positive height", &self.window_height);
        }
        if self.target_tps == 0 {
            return invalid("target_tps", "a positive tick rate", &self.target_tps);
        }
        if !(self.camera_zoom.is_finite() && self.camera_zoom > 0.0) {
            return invalid("camera_zoom", "a positive zoom", &self.camera_zoom);
        }
        if !(self.camera_follow_rate.is_finite() && self.camera_follow_rate >= 0.0) {
            return invalid(
                "camera_follow_rate",
                "a non-negative rate",
                &self.camera_follow_rate,
            );
        }
        if self.mob_spawn_half_extent < 0 {
            return invalid(
                "mob_spawn_half_extent",
                "a non-negative extent",
                &self.mob_spawn_half_extent,
            );
        }
        let radius_range = 0..=MAX_BACKGROUND_RADIUS;
        let expected_radius = format!("a radius in 0..={MAX_BACKGROUND_RADIUS}");
        if !radius_range.contains(&self.tile_radius_x) {
            return invalid("tile_radius_x", &expected_radius, &self.tile_radius_x);
        }
        if !radius_range.contains(&self.tile_radius_y) {
            return invalid("tile_radius_y", &expected_radius, &self.tile_radius_y);
        }
        Ok(())
    }

    pub(crate) fn to_loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: "Brawl".to_string(),
            window_width: self.window_width,
            window_height: self.window_height,
            target_tps: self.target_tps,
            max_render_fps: self.max_render_fps,
            ..LoopConfig::default()
        }
    }
}

fn resolve_config_path(env_value: Option<OsString>, config_dir: &Path) -> Option<PathBuf> {
    if let Some(value) = env_value.filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(value));
    }
    let default_path = config_dir.join(DEFAULT_CONFIG_FILE);
    default_path.is_file().then_some(default_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = GameConfig::from_json_str(Path::new("game.json"), "{}").expect("parse");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let raw = r#"{ "mob_count": 3, "rng_seed": 7, "camera_zoom": 1.5 }"#;
        let config = GameConfig::from_json_str(Path::new("game.json"), raw).expect("parse");

        assert_eq!(config.mob_count, 3);
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.camera_zoom, 1.5);
        assert_eq!(config.window_width, 800);
        assert_eq!(config.camera_follow_rate, 15.0);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let error = GameConfig::from_json_str(Path::new("game.json"), r#"{ "mob_cuont": 3 }"#)
            .expect_err("unknown field");
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().contains("mob_cuont"));
    }

    #[test]
    fn type_error_reports_field_path() {
        let error = GameConfig::from_json_str(Path::new("game.json"), r#"{ "mob_count": "ten" }"#)
            .expect_err("type error");
        match error {
            ConfigError::Parse { field, .. } => assert_eq!(field, "mob_count"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_zoom_fails_validation() {
        let error = GameConfig::from_json_str(Path::new("game.json"), r#"{ "camera_zoom": 0.0 }"#)
            .expect_err("zoom");
        match error {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "camera_zoom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn oversized_tile_radius_fails_validation() {
        let raw = format!(r#"{{ "tile_radius_y": {} }}"#, MAX_BACKGROUND_RADIUS + 1);
        let error = GameConfig::from_json_str(Path::new("game.json"), &raw).expect_err("radius");
        match error {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "tile_radius_y"),
            other => panic!("unexpected error: {other}"),
        }

        let raw = r#"{ "tile_radius_x": 2147483647 }"#;
        assert!(matches!(
            GameConfig::from_json_str(Path::new("game.json"), raw),
            Err(ConfigError::Invalid { field: "tile_radius_x", .. })
        ));

        let raw = format!(r#"{{ "tile_radius_x": {MAX_BACKGROUND_RADIUS} }}"#);
        assert!(GameConfig::from_json_str(Path::new("game.json"), &raw).is_ok());
    }

    #[test]
    fn default_file_is_used_only_when_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(resolve_config_path(None, dir.path()), None);

        let path = dir.path().join("game.json");
        fs::write(&path, r#"{ "tile_radius_x": 12 }"#).expect("write config");
        assert_eq!(resolve_config_path(None, dir.path()), Some(path.clone()));

        let config = GameConfig::load_file(&path).expect("load");
        assert_eq!(config.tile_radius_x, 12);
    }

    #[test]
    fn env_path_wins_over_default_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("game.json"), "{}").expect("write config");
        let custom = dir.path().join("custom.json");

        assert_eq!(
            resolve_config_path(Some(custom.clone().into_os_string()), dir.path()),
            Some(custom.clone())
        );
        assert!(matches!(
            GameConfig::load_file(&custom),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn loop_config_carries_window_and_tick_rate() {
        let config = GameConfig {
            window_width: 1024,
            window_height: 768,
            target_tps: 30,
            max_render_fps: Some(120),
            ..GameConfig::default()
        };
        let loop_config = config.to_loop_config();
        assert_eq!(loop_config.max_render_fps, Some(120));
        assert_eq!(GameConfig::default().to_loop_config().max_render_fps, None);
        assert_eq!(loop_config.window_width, 1024);
        assert_eq!(loop_config.window_height, 768);
        assert_eq!(loop_config.target_tps, 30);
        assert_eq!(loop_config.max_ticks_per_frame, 5);
    }
}
