use brawl_engine::{resolve_app_paths, AppPaths, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, GameConfig};
use super::gameplay::BrawlScene;

pub(crate) struct AppWiring {
    pub(crate) paths: AppPaths,
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Brawl Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        textures_dir = %paths.textures_dir.display(),
        archetypes = %paths.archetypes_path.display(),
        "app_paths_resolved"
    );

    let (game_config, config_path) = GameConfig::load(&paths.config_dir)?;
    match &config_path {
        Some(path) => info!(path = %path.display(), "game_config_loaded"),
        None => info!("game_config_defaults"),
    }

    let config = game_config.to_loop_config();
    let scene: Box<dyn Scene> = Box::new(BrawlScene::new(game_config));

    Ok(AppWiring {
        paths,
        config,
        scene,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
