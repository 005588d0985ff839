use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Camera2D, SceneWorld, MAX_BACKGROUND_RADIUS, PLACEHOLDER_SIZE};
use crate::geometry::{Range2f, Vec2};
use crate::texture::Texture;
use crate::tile::{tile_pos_to_world, TilePos, TILE_WIDTH};

use super::transform::{camera_pixels_per_world, world_to_screen};
use super::Viewport;

const CLEAR_COLOR: [u8; 4] = [245, 245, 245, 255];
const CHECKER_TILE_COLOR: [u8; 4] = [130, 130, 130, 255];
const CURSOR_TILE_COLOR: [u8; 4] = [230, 41, 55, 255];
const PLACEHOLDER_COLOR: [u8; 4] = [80, 80, 200, 255];
const HOVER_OUTLINE_COLOR: [u8; 4] = [255, 255, 255, 255];
const DEBUG_BOUNDS_COLOR: [u8; 4] = [230, 41, 55, 96];
const TILE_SIZE: Vec2 = Vec2::new(TILE_WIDTH, TILE_WIDTH);

/// Axis-aligned pixel rectangle, `right` and `bottom` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let viewport = self.viewport;
        draw_scene(self.pixels.frame_mut(), viewport, world);
        self.pixels.render()
    }
}

fn draw_scene(frame: &mut [u8], viewport: Viewport, world: &SceneWorld) {
    let camera = world.camera();
    let visual = world.visual_state();

    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&CLEAR_COLOR);
    }

    for tile in checker_tiles(visual.background_center, visual.background_radius) {
        let rect = tile_screen_rect(camera, viewport, tile);
        fill_rect_clipped(frame, viewport, rect, CHECKER_TILE_COLOR);
    }

    if let Some(tile) = visual.cursor_tile {
        let rect = tile_screen_rect(camera, viewport, tile);
        fill_rect_clipped(frame, viewport, rect, CURSOR_TILE_COLOR);
    }

    let scale = camera_pixels_per_world(camera);
    for (_, entity) in world.entities().iter() {
        let center = world_to_screen(entity.position, camera, viewport);
        let texture = world.textures().get(entity.texture);
        if texture.is_nil() {
            let placeholder = Range2f::center_center(PLACEHOLDER_SIZE).shifted(entity.position);
            let rect = world_box_screen_rect(camera, viewport, placeholder);
            fill_rect_clipped(frame, viewport, rect, PLACEHOLDER_COLOR);
        } else {
            draw_sprite_rotated(frame, viewport, center, texture, scale, entity.angle);
        }
    }

    if visual.show_debug_bounds {
        draw_debug_bounds(frame, viewport, world);
    }

    if let Some(bounds) = visual
        .hovered_entity
        .and_then(|id| world.entity_bounds(id))
    {
        let rect = world_box_screen_rect(camera, viewport, bounds);
        outline_rect_clipped(frame, viewport, rect, HOVER_OUTLINE_COLOR);
    }
}

/// Translucent hit box over every live entity.
fn draw_debug_bounds(frame: &mut [u8], viewport: Viewport, world: &SceneWorld) {
    let camera = world.camera();
    for (id, _) in world.entities().iter() {
        if let Some(bounds) = world.entity_bounds(id) {
            let rect = world_box_screen_rect(camera, viewport, bounds);
            blend_rect_clipped(frame, viewport, rect, DEBUG_BOUNDS_COLOR);
        }
    }
}

/// Tiles of the checkerboard pattern in the half-open window around `center`.
/// Each radius is clamped to `0..=MAX_BACKGROUND_RADIUS`.
fn checker_tiles(center: TilePos, radius: (i32, i32)) -> impl Iterator<Item = TilePos> {
    let radius_x = radius.0.clamp(0, MAX_BACKGROUND_RADIUS);
    let radius_y = radius.1.clamp(0, MAX_BACKGROUND_RADIUS);
    let columns = center.x.saturating_sub(radius_x)..center.x.saturating_add(radius_x);
    (center.y.saturating_sub(radius_y)..center.y.saturating_add(radius_y))
        .flat_map(move |y| columns.clone().map(move |x| TilePos::new(x, y)))
        .filter(|tile| is_checker_tile(tile.x, tile.y))
}

fn is_checker_tile(x: i32, y: i32) -> bool {
    let row_shift = i32::from(y.rem_euclid(2) == 0);
    (x.rem_euclid(2) + row_shift) % 2 == 0
}

fn tile_screen_rect(camera: &Camera2D, viewport: Viewport, tile: TilePos) -> ScreenRectPx {
    let tile_box = Range2f::center_center(TILE_SIZE).shifted(tile_pos_to_world(tile));
    world_box_screen_rect(camera, viewport, tile_box)
}

fn world_box_screen_rect(camera: &Camera2D, viewport: Viewport, bounds: Range2f) -> ScreenRectPx {
    let min = world_to_screen(bounds.min, camera, viewport);
    let max = world_to_screen(bounds.max, camera, viewport);
    ScreenRectPx {
        left: min.x.round() as i32,
        top: min.y.round() as i32,
        right: max.x.round() as i32,
        bottom: max.y.round() as i32,
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    if x >= width {
        return;
    }
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

fn fill_rect_clipped(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let left = rect.left.max(0);
    let top = rect.top.max(0);
    let right = rect.right.min(viewport.width as i32);
    let bottom = rect.bottom.min(viewport.height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
        }
    }
}

fn blend_over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let alpha = u32::from(src[3]);
    let mix = |s: u8, d: u8| ((u32::from(s) * alpha + u32::from(d) * (255 - alpha) + 127) / 255) as u8;
    [mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2]), 255]
}

fn blend_rect_clipped(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let width = viewport.width as usize;
    let left = rect.left.max(0);
    let top = rect.top.max(0);
    let right = rect.right.min(viewport.width as i32);
    let bottom = rect.bottom.min(viewport.height as i32);
    for y in top..bottom {
        for x in left..right {
            let offset = (y as usize * width + x as usize) * 4;
            let Some(pixel) = frame.get_mut(offset..offset + 4) else {
                continue;
            };
            let dst = [pixel[0], pixel[1], pixel[2], pixel[3]];
            pixel.copy_from_slice(&blend_over(dst, color));
        }
    }
}

fn outline_rect_clipped(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    if rect.left >= rect.right || rect.top >= rect.bottom {
        return;
    }
    let width = viewport.width as usize;
    for x in rect.left..rect.right {
        write_pixel_rgba_clipped(frame, width, x, rect.top, color);
        write_pixel_rgba_clipped(frame, width, x, rect.bottom - 1, color);
    }
    for y in rect.top..rect.bottom {
        write_pixel_rgba_clipped(frame, width, rect.left, y, color);
        write_pixel_rgba_clipped(frame, width, rect.right - 1, y, color);
    }
}

/// Nearest-neighbour blit of `texture` centred on `center` (screen pixels),
/// scaled by `scale` and turned clockwise on screen by `angle_degrees`.
fn draw_sprite_rotated(
    frame: &mut [u8],
    viewport: Viewport,
    center: Vec2,
    texture: &Texture,
    scale: f32,
    angle_degrees: f32,
) {
    if texture.is_nil() || !(scale.is_finite() && scale > 0.0) {
        return;
    }
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let half_w = texture.width() as f32 * 0.5;
    let half_h = texture.height() as f32 * 0.5;
    let reach = (half_w * half_w + half_h * half_h).sqrt() * scale;

    let left = ((center.x - reach).floor() as i32).max(0);
    let top = ((center.y - reach).floor() as i32).max(0);
    let right = ((center.x + reach).ceil() as i32).min(viewport.width as i32);
    let bottom = ((center.y + reach).ceil() as i32).min(viewport.height as i32);

    for out_y in top..bottom {
        for out_x in left..right {
            let dx = (out_x as f32 + 0.5 - center.x) / scale;
            let dy = (out_y as f32 + 0.5 - center.y) / scale;
            // Inverse rotation back into texture space.
            let src_x = dx * cos + dy * sin + half_w;
            let src_y = -dx * sin + dy * cos + half_h;
            if src_x < 0.0 || src_y < 0.0 {
                continue;
            }
            let Some(texel) = texture.pixel(src_x as u32, src_y as u32) else {
                continue;
            };
            if texel[3] == 0 {
                continue;
            }
            write_pixel_rgba_clipped(frame, viewport.width as usize, out_x, out_y, texel);
        }
    }
}
