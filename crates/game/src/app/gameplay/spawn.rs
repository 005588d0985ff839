use brawl_engine::{snap_to_tile_grid, EntityArchetype, EntityId, SceneWorld, Vec2};
use rand::Rng;
use tracing::warn;

/// Random integer point in `[-half_extent, half_extent]^2`, snapped to the
/// tile grid.
pub(crate) fn random_spawn_position(rng: &mut impl Rng, half_extent: i32) -> Vec2 {
    let x = rng.gen_range(-half_extent..=half_extent);
    let y = rng.gen_range(-half_extent..=half_extent);
    snap_to_tile_grid(Vec2::new(x as f32, y as f32))
}

/// Spawns up to `count` goblins, always leaving one slot free for the player.
pub(crate) fn spawn_mobs(
    world: &mut SceneWorld,
    rng: &mut impl Rng,
    count: usize,
    half_extent: i32,
) -> Vec<EntityId> {
    let capacity = world.entities().capacity();
    let free_for_mobs = capacity.saturating_sub(world.entity_count() + 1);
    let allowed = count.min(free_for_mobs);
    if allowed < count {
        warn!(
            requested = count,
            spawned = allowed,
            capacity,
            "mob_spawn_truncated"
        );
    }

    let mut ids = Vec::with_capacity(allowed);
    for _ in 0..allowed {
        let position = random_spawn_position(rng, half_extent);
        let mob = world.archetypes().spawn(EntityArchetype::Goblin, position);
        match world.entities_mut().create(mob) {
            Ok(id) => ids.push(id),
            Err(error) => {
                warn!(error = %error, "mob_spawn_failed");
                break;
            }
        }
    }
    ids
}
