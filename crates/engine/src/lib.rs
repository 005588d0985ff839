use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod animate;
pub mod app;
pub mod content;
pub mod geometry;
pub mod motion;
pub mod texture;
pub mod tile;
pub mod world;

pub use animate::{almost_equals, animate_toward, animate_toward_vec2, SNAP_EPSILON};
pub use app::{
    run_app, screen_to_world_px, world_to_screen_px, AppError, Camera2D, InputAction,
    InputSnapshot, LoopConfig, Renderer, Scene, SceneVisualState, SceneWorld, Viewport,
    MAX_BACKGROUND_RADIUS, PIXELS_PER_WORLD, PLACEHOLDER_SIZE,
};
pub use content::{
    ArchetypeDatabase, ArchetypeDef, ContentError, ContentErrorCode, SourceLocation,
};
pub use geometry::{Range2f, Vec2};
pub use motion::{MotionEvent, MotionState, SwipeKind};
pub use texture::{Texture, TextureId, TextureTable};
pub use tile::{
    snap_to_tile_grid, tile_pos_to_world, tile_to_world, world_to_tile, world_to_tile_pos,
    TilePos, TILE_WIDTH,
};
pub use world::{
    CombatStats, Entity, EntityArchetype, EntityId, World, WorldError, MAX_ENTITY_COUNT,
};

pub const ROOT_ENV_VAR: &str = "BRAWL_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub textures_dir: PathBuf,
    pub archetypes_path: PathBuf,
    pub config_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        Self {
            textures_dir: assets_dir.join("textures"),
            archetypes_path: assets_dir.join("base").join("archetypes.xml"),
            config_dir: root.join("config"),
            assets_dir,
            root,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "BRAWL_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
export {env_var}=\"/path/to/brawl\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    Ok(AppPaths::from_root(root))
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("crates")).expect("crates dir");
        assert!(!is_repo_marker(dir.path()));

        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("write manifest");
        assert!(is_repo_marker(dir.path()));
    }

    #[test]
    fn repo_marker_accepts_assets_without_crates() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("write manifest");
        assert!(!is_repo_marker(dir.path()));

        fs::create_dir(dir.path().join("assets")).expect("assets dir");
        assert!(is_repo_marker(dir.path()));
    }

    #[test]
    fn app_paths_hang_off_root() {
        let paths = AppPaths::from_root(PathBuf::from("/srv/brawl"));
        assert_eq!(paths.textures_dir, Path::new("/srv/brawl/assets/textures"));
        assert_eq!(
            paths.archetypes_path,
            Path::new("/srv/brawl/assets/base/archetypes.xml")
        );
        assert_eq!(paths.config_dir, Path::new("/srv/brawl/config"));
    }
}
