use super::input::ActionStates;
use super::InputAction;
use crate::content::ArchetypeDatabase;
use crate::geometry::{Range2f, Vec2};
use crate::texture::TextureTable;
use crate::tile::{TilePos, TILE_WIDTH};
use crate::world::{EntityId, World};

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.25;
pub const CAMERA_ZOOM_MAX: f32 = 8.0;

/// Bounds used for entities whose texture is the nil texture.
pub const PLACEHOLDER_SIZE: Vec2 = Vec2::new(TILE_WIDTH, TILE_WIDTH);

/// Largest checkerboard half extent the renderer draws, in tiles.
pub const MAX_BACKGROUND_RADIUS: i32 = 256;

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    right_click_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        right_click_pressed: bool,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            right_click_pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the tick the action went down.
    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.actions.set_pressed(action, pressed);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_right_click_pressed(mut self, right_click_pressed: bool) -> Self {
        self.right_click_pressed = right_click_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn right_click_pressed(&self) -> bool {
        self.right_click_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

/// Per-frame presentation state written by the scene and read by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneVisualState {
    pub hovered_entity: Option<EntityId>,
    pub cursor_tile: Option<TilePos>,
    /// Tile the checkerboard background is centred on.
    pub background_center: TilePos,
    /// Half extent of the checkerboard, in tiles.
    pub background_radius: (i32, i32),
    /// Shade every entity's hit box.
    pub show_debug_bounds: bool,
}

impl Default for SceneVisualState {
    fn default() -> Self {
        Self {
            hovered_entity: None,
            cursor_tile: None,
            background_center: TilePos::default(),
            background_radius: (40, 30),
            show_debug_bounds: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    entities: World,
    camera: Camera2D,
    textures: TextureTable,
    archetypes: ArchetypeDatabase,
    visual_state: SceneVisualState,
}

impl SceneWorld {
    pub fn entities(&self) -> &World {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut World {
        &mut self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn textures(&self) -> &TextureTable {
        &self.textures
    }

    pub fn set_textures(&mut self, textures: TextureTable) {
        self.textures = textures;
    }

    pub fn archetypes(&self) -> &ArchetypeDatabase {
        &self.archetypes
    }

    pub fn set_archetypes(&mut self, archetypes: ArchetypeDatabase) {
        self.archetypes = archetypes;
    }

    pub fn visual_state(&self) -> &SceneVisualState {
        &self.visual_state
    }

    pub fn visual_state_mut(&mut self) -> &mut SceneVisualState {
        &mut self.visual_state
    }

    /// Hit box of the entity: its sprite size, anchored at its position.
    pub fn entity_bounds(&self, id: EntityId) -> Option<Range2f> {
        let entity = self.entities.get(id)?;
        let texture = self.textures.get(entity.texture);
        let size = if texture.is_nil() {
            PLACEHOLDER_SIZE
        } else {
            texture.size()
        };
        Some(Range2f::bottom_center(size).shifted(entity.position))
    }

    /// Highest-slot live entity whose bounds contain `point`.
    pub fn pick_topmost_entity_at(&self, point: Vec2) -> Option<EntityId> {
        self.entities
            .iter()
            .map(|(id, _)| id)
            .filter(|id| {
                self.entity_bounds(*id)
                    .is_some_and(|bounds| bounds.contains(point))
            })
            .last()
    }

    /// Drops all entities and per-frame state; loaded assets are kept.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.camera = Camera2D::default();
        self.visual_state = SceneVisualState::default();
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

/// Owns the running scene together with its world.
pub(crate) struct SceneRunner {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRunner {
    pub(crate) fn new(scene: Box<dyn Scene>, world: SceneWorld) -> Self {
        Self {
            scene,
            world,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) {
        if !self.is_loaded {
            return;
        }
        self.scene.update(fixed_dt_seconds, input, &mut self.world);
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.clear();
        self.is_loaded = false;
    }
}
