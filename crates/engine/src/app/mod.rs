mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    camera_pixels_per_world, screen_to_world_px, world_to_screen, world_to_screen_px, Renderer,
    Viewport, PIXELS_PER_WORLD,
};
pub use scene::{
    Camera2D, InputSnapshot, Scene, SceneVisualState, SceneWorld, CAMERA_ZOOM_DEFAULT,
    CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN, MAX_BACKGROUND_RADIUS, PLACEHOLDER_SIZE,
};
