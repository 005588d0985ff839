use brawl_engine::motion::{begin_swipe_left, integrate_all, order_move, resolve_arrivals};
use brawl_engine::{
    animate_toward_vec2, screen_to_world_px, world_to_tile_pos, EntityArchetype, EntityId,
    InputAction, InputSnapshot, Scene, SceneWorld, Vec2,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::config::GameConfig;

mod spawn;

const ATTACK_LEGEND: &str = "Q - Left | W - Right | E - Up | R - Down";

/// One player among idle goblins on an endless checkerboard.
pub(crate) struct BrawlScene {
    config: GameConfig,
    rng: StdRng,
    player_id: Option<EntityId>,
    mob_ids: Vec<EntityId>,
}

impl BrawlScene {
    pub(crate) fn new(config: GameConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            player_id: None,
            mob_ids: Vec::new(),
        }
    }

    fn spawn_player(&mut self, world: &mut SceneWorld) {
        let player = world
            .archetypes()
            .spawn(EntityArchetype::Player, Vec2::ZERO);
        match world.entities_mut().create(player) {
            Ok(id) => self.player_id = Some(id),
            Err(error) => {
                warn!(error = %error, "player_spawn_failed");
                self.player_id = None;
            }
        }
    }

    /// Move and swipe commands for the player, aimed at the cursor.
    fn apply_player_commands(
        &self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        cursor_world: Option<Vec2>,
        world: &mut SceneWorld,
    ) {
        let (Some(player_id), Some(target)) = (self.player_id, cursor_world) else {
            return;
        };
        let Some(player) = world.entities_mut().get_mut(player_id) else {
            return;
        };

        if input.right_click_pressed() {
            if order_move(player, target) {
                debug!(x = target.x, y = target.y, "player_move_ordered");
            } else {
                debug!("player_move_ignored_while_attacking");
            }
        }
        if input.was_pressed(InputAction::SwipeLeft) {
            if begin_swipe_left(player, target, fixed_dt_seconds) {
                debug!(x = target.x, y = target.y, "player_swipe_started");
            } else {
                debug!("player_swipe_ignored_while_attacking");
            }
        }
    }

    fn follow_player(&self, fixed_dt_seconds: f32, world: &mut SceneWorld) {
        let Some(player) = self.player_id.and_then(|id| world.entities().get(id)) else {
            return;
        };
        if player.is_attacking() {
            return;
        }
        let player_position = player.position;
        let camera = world.camera_mut();
        let (next, _) = animate_toward_vec2(
            camera.position,
            player_position,
            fixed_dt_seconds,
            self.config.camera_follow_rate,
        );
        camera.position = next;
    }
}

impl Scene for BrawlScene {
    fn load(&mut self, world: &mut SceneWorld) {
        world.camera_mut().position = Vec2::ZERO;
        world.camera_mut().set_zoom_clamped(self.config.camera_zoom);
        world.visual_state_mut().background_radius =
            (self.config.tile_radius_x, self.config.tile_radius_y);
        world.visual_state_mut().show_debug_bounds = self.config.debug_bounds;

        self.mob_ids = spawn::spawn_mobs(
            world,
            &mut self.rng,
            self.config.mob_count,
            self.config.mob_spawn_half_extent,
        );
        self.spawn_player(world);

        info!(
            mob_count = self.mob_ids.len(),
            entity_count = world.entity_count(),
            seeded = self.config.rng_seed.is_some(),
            "arena_spawned"
        );
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot, world: &mut SceneWorld) {
        resolve_arrivals(world.entities_mut());

        let window_size = input.window_size();
        let cursor_world = input
            .cursor_position_px()
            .map(|cursor_px| screen_to_world_px(world.camera(), window_size, cursor_px));
        world.visual_state_mut().cursor_tile = cursor_world.map(world_to_tile_pos);

        self.apply_player_commands(fixed_dt_seconds, input, cursor_world, world);
        self.follow_player(fixed_dt_seconds, world);

        integrate_all(world.entities_mut(), fixed_dt_seconds);

        let player_tile = self
            .player_id
            .and_then(|id| world.entities().get(id))
            .map(|player| world_to_tile_pos(player.position));
        if let Some(tile) = player_tile {
            world.visual_state_mut().background_center = tile;
        }

        let hovered = cursor_world.and_then(|point| world.pick_topmost_entity_at(point));
        world.visual_state_mut().hovered_entity = hovered;
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        info!(mob_count = self.mob_ids.len(), "arena_unloaded");
        self.player_id = None;
        self.mob_ids.clear();
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        let player = self.player_id.and_then(|id| world.entities().get(id))?;
        Some(format!(
            "Brawl | {ATTACK_LEGEND} | player ({:.1}, {:.1})",
            player.position.x, player.position.y
        ))
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
