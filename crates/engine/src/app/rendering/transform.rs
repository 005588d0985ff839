//! Camera mapping between world and window pixels. World +y points down the
//! screen, and the camera position sits at the viewport centre.

use crate::app::Camera2D;
use crate::geometry::Vec2;

pub const PIXELS_PER_WORLD: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Viewport {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

pub fn camera_pixels_per_world(camera: &Camera2D) -> f32 {
    PIXELS_PER_WORLD * camera.effective_zoom()
}

pub fn world_to_screen(world: Vec2, camera: &Camera2D, viewport: Viewport) -> Vec2 {
    let scale = camera_pixels_per_world(camera);
    Vec2 {
        x: (world.x - camera.position.x) * scale + viewport.width as f32 * 0.5,
        y: (world.y - camera.position.y) * scale + viewport.height as f32 * 0.5,
    }
}

pub fn world_to_screen_px(camera: &Camera2D, window_size: (u32, u32), world: Vec2) -> (i32, i32) {
    let screen = world_to_screen(world, camera, Viewport::from(window_size));
    (screen.x.round() as i32, screen.y.round() as i32)
}

pub fn screen_to_world_px(camera: &Camera2D, window_size: (u32, u32), screen_px: Vec2) -> Vec2 {
    let scale = camera_pixels_per_world(camera);
    Vec2 {
        x: (screen_px.x - window_size.0 as f32 * 0.5) / scale + camera.position.x,
        y: (screen_px.y - window_size.1 as f32 * 0.5) / scale + camera.position.y,
    }
}
