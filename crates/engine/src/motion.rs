//! Walk and swipe-attack phases of an entity.
//!
//! A tick is split in two: [`resolve_arrivals`] ends phases whose target has
//! been reached, then commands may start new phases, then [`integrate_all`]
//! advances every entity along its current phase.

use tracing::debug;

use crate::geometry::Vec2;
use crate::world::{Entity, EntityId, World};

/// Per-axis distance at which a walk or swipe counts as arrived.
pub const ARRIVAL_TOLERANCE: f32 = 5.0;
/// Tick rate at which `Swipe::angular_rate` is degrees per tick.
pub const REFERENCE_TICK_RATE: f32 = 60.0;

const WALK_FACING_OFFSET_DEGREES: f32 = 90.0;
const SWIPE_FACING_OFFSET_DEGREES: f32 = 90.0 + 90.0;
const SWIPE_SWEEP_DEGREES: f32 = -180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeKind {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walk {
    pub target: Vec2,
    pub axis: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub kind: SwipeKind,
    pub axis: Vec2,
    pub end_position: Vec2,
    pub return_position: Vec2,
    pub return_angle: f32,
    pub angular_rate: f32,
    /// Walk interrupted by this swipe; it takes over again once the swipe ends.
    pub suspended_walk: Option<Walk>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MotionState {
    #[default]
    Idle,
    Walking(Walk),
    Attacking(Swipe),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    WalkArrived,
    SwipeFinished(SwipeKind),
}

fn within_tolerance(position: Vec2, target: Vec2) -> bool {
    (position.x - target.x).abs() <= ARRIVAL_TOLERANCE
        && (position.y - target.y).abs() <= ARRIVAL_TOLERANCE
}

/// Starts (or redirects) a walk toward `target` and turns the entity to face
/// it. Ignored while attacking.
pub fn order_move(entity: &mut Entity, target: Vec2) -> bool {
    if entity.is_attacking() {
        return false;
    }
    let toward = target - entity.position;
    entity.angle = toward.angle_degrees() + WALK_FACING_OFFSET_DEGREES;
    entity.motion = MotionState::Walking(Walk {
        target,
        axis: toward.normalized(),
    });
    true
}

/// Starts a left swipe aimed at `target`. Ignored while already attacking.
///
/// The entity jumps `attack_range` along the perpendicular of its aim, then
/// sweeps back through its original spot to `attack_range` on the other
/// side while turning through -180 degrees. `dt` is the duration of the
/// triggering tick and fixes the angular rate for the whole swipe.
pub fn begin_swipe_left(entity: &mut Entity, target: Vec2, dt: f32) -> bool {
    if entity.is_attacking() {
        return false;
    }

    let origin = entity.position;
    let return_angle = entity.angle;
    let toward = target - origin;
    let range = entity.stats.attack_range;

    let sweep = toward.perpendicular().normalized();
    let end_position = origin + sweep * -range;
    let start_position = origin + sweep * range;
    let axis = (end_position - start_position).normalized();

    let distance = start_position.distance(end_position);
    let ticks = distance / (entity.stats.attack_speed * dt);
    let angular_rate = if ticks.is_finite() && ticks > 0.0 {
        SWIPE_SWEEP_DEGREES / ticks
    } else {
        0.0
    };

    let suspended_walk = match entity.motion {
        MotionState::Walking(walk) => Some(walk),
        _ => None,
    };

    entity.angle = toward.angle_degrees() + SWIPE_FACING_OFFSET_DEGREES;
    entity.position = start_position;
    entity.motion = MotionState::Attacking(Swipe {
        kind: SwipeKind::Left,
        axis,
        end_position,
        return_position: origin,
        return_angle,
        angular_rate,
        suspended_walk,
    });
    true
}

/// Ends the current phase if its target is within tolerance.
pub fn resolve_arrival(entity: &mut Entity) -> Option<MotionEvent> {
    match entity.motion {
        MotionState::Idle => None,
        MotionState::Walking(walk) => {
            if !within_tolerance(entity.position, walk.target) {
                return None;
            }
            entity.motion = MotionState::Idle;
            Some(MotionEvent::WalkArrived)
        }
        MotionState::Attacking(swipe) => {
            if !within_tolerance(entity.position, swipe.end_position) {
                return None;
            }
            entity.position = swipe.return_position;
            entity.angle = swipe.return_angle;
            entity.motion = swipe
                .suspended_walk
                .map_or(MotionState::Idle, MotionState::Walking);
            Some(MotionEvent::SwipeFinished(swipe.kind))
        }
    }
}

pub fn integrate(entity: &mut Entity, dt: f32) {
    match entity.motion {
        MotionState::Idle => {}
        MotionState::Walking(walk) => {
            entity.position += walk.axis * (entity.stats.movement_speed * dt);
        }
        MotionState::Attacking(swipe) => {
            entity.position += swipe.axis * (entity.stats.attack_speed * dt);
            entity.angle += swipe.angular_rate * dt * REFERENCE_TICK_RATE;
        }
    }
}

pub fn resolve_arrivals(world: &mut World) -> Vec<(EntityId, MotionEvent)> {
    let mut events = Vec::new();
    for (id, entity) in world.iter_mut() {
        if let Some(event) = resolve_arrival(entity) {
            debug!(entity = id.0, ?event, "motion_phase_ended");
            events.push((id, event));
        }
    }
    events
}

pub fn integrate_all(world: &mut World, dt: f32) {
    for (_, entity) in world.iter_mut() {
        integrate(entity, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureId;
    use crate::world::{CombatStats, EntityArchetype};

    const DT: f32 = 1.0 / 60.0;

    fn player_at(position: Vec2) -> Entity {
        Entity::new(EntityArchetype::Player, TextureId::Player, position).with_stats(CombatStats {
            movement_speed: 100.0,
            attack_speed: 200.0,
            attack_range: 50.0,
            health: 0,
            damage: 0,
        })
    }

    /// Runs resolve-then-integrate ticks until `done` holds after a resolve,
    /// returning the number of ticks taken.
    fn tick_until(entity: &mut Entity, max_ticks: usize, done: impl Fn(&Entity) -> bool) -> usize {
        for tick in 0..max_ticks {
            resolve_arrival(entity);
            if done(entity) {
                return tick;
            }
            integrate(entity, DT);
        }
        panic!("condition not reached within {max_ticks} ticks: {entity:?}");
    }

    #[test]
    fn walk_reaches_target_within_one_second() {
        let mut entity = player_at(Vec2::ZERO);
        assert!(order_move(&mut entity, Vec2::new(100.0, 0.0)));
        assert_eq!(entity.end_movement_position(), Some(Vec2::new(100.0, 0.0)));
        assert_eq!(entity.input_axis(), Vec2::new(1.0, 0.0));

        let ticks = tick_until(&mut entity, 120, |e| e.motion == MotionState::Idle);

        assert!(ticks <= 60, "ticks={ticks}");
        assert_eq!(entity.end_movement_position(), None);
        assert_eq!(entity.input_axis(), Vec2::ZERO);
        assert!(within_tolerance(entity.position, Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn walk_arrival_needs_both_axes_within_tolerance() {
        let target = Vec2::new(100.0, 0.0);
        for position in [Vec2::new(98.0, 20.0), Vec2::new(80.0, 2.0), Vec2::new(94.9, 0.0)] {
            let mut entity = player_at(position);
            order_move(&mut entity, target);
            assert_eq!(resolve_arrival(&mut entity), None, "position={position:?}");
            assert_eq!(entity.end_movement_position(), Some(target));
        }

        let mut entity = player_at(Vec2::new(95.0, -5.0));
        order_move(&mut entity, target);
        assert_eq!(resolve_arrival(&mut entity), Some(MotionEvent::WalkArrived));
        assert_eq!(entity.motion, MotionState::Idle);
    }

    #[test]
    fn move_order_faces_target_with_quarter_turn_offset() {
        let mut entity = player_at(Vec2::ZERO);
        order_move(&mut entity, Vec2::new(0.0, 30.0));
        assert!((entity.angle - 180.0).abs() < 1e-4);

        order_move(&mut entity, Vec2::new(30.0, 0.0));
        assert!((entity.angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn swipe_left_sets_up_bracketing_sweep() {
        let mut entity = player_at(Vec2::ZERO);
        assert!(begin_swipe_left(&mut entity, Vec2::new(100.0, 0.0), DT));

        assert_eq!(entity.attack(), Some(SwipeKind::Left));
        assert!((entity.angle - 180.0).abs() < 1e-4);
        assert!((entity.position.x).abs() < 1e-5);
        assert!((entity.position.y - 50.0).abs() < 1e-4);

        let end = entity.end_attack_position().expect("end position");
        assert!((end.x).abs() < 1e-5);
        assert!((end.y + 50.0).abs() < 1e-4);
        assert_eq!(entity.attack_input_axis(), Vec2::new(0.0, -1.0));
        assert_eq!(entity.before_attack_position(), Some(Vec2::ZERO));
        assert_eq!(entity.angle_before_attack(), Some(0.0));

        // 100 units at 200 u/s is 30 reference ticks for -180 degrees.
        assert!((entity.attack_omega() + 6.0).abs() < 1e-3, "omega={}", entity.attack_omega());
    }

    #[test]
    fn swipe_restores_pose_exactly() {
        let mut entity = player_at(Vec2::ZERO);
        begin_swipe_left(&mut entity, Vec2::new(100.0, 0.0), DT);

        let ticks = tick_until(&mut entity, 200, |e| !e.is_attacking());

        assert!((28..=31).contains(&ticks), "ticks={ticks}");
        assert_eq!(entity.position, Vec2::ZERO);
        assert_eq!(entity.angle, 0.0);
        assert_eq!(entity.attack(), None);
        assert_eq!(entity.before_attack_position(), None);
        assert_eq!(entity.angle_before_attack(), None);
        assert_eq!(entity.end_attack_position(), None);
    }

    #[test]
    fn swipe_turns_through_half_circle_before_restoring() {
        let mut entity = player_at(Vec2::new(15.0, -30.0));
        entity.angle = 33.0;
        begin_swipe_left(&mut entity, Vec2::new(15.0, 70.0), DT);
        let start_angle = entity.angle;

        let mut last_angle = start_angle;
        while entity.is_attacking() {
            last_angle = entity.angle;
            integrate(&mut entity, DT);
            resolve_arrival(&mut entity);
        }

        let turned = last_angle - start_angle;
        assert!(turned < -150.0 && turned > -190.0, "turned={turned}");
        assert_eq!(entity.angle, 33.0);
        assert_eq!(entity.position, Vec2::new(15.0, -30.0));
    }

    #[test]
    fn walk_never_integrates_while_attacking() {
        let mut entity = player_at(Vec2::ZERO);
        order_move(&mut entity, Vec2::new(0.0, 300.0));
        integrate(&mut entity, DT);
        begin_swipe_left(&mut entity, Vec2::new(100.0, 0.0), DT);

        while entity.is_attacking() {
            assert_eq!(entity.end_movement_position(), None);
            assert_eq!(entity.input_axis(), Vec2::ZERO);
            let before = entity.position;
            let expected = entity.attack_input_axis() * (200.0 * DT);
            integrate(&mut entity, DT);
            let step = entity.position - before;
            assert!(
                (step - expected).length() < 1e-4,
                "walk axis leaked into swipe: {step:?}"
            );
            resolve_arrival(&mut entity);
        }
    }

    #[test]
    fn walk_resumes_after_swipe() {
        let mut entity = player_at(Vec2::ZERO);
        order_move(&mut entity, Vec2::new(0.0, 300.0));
        let walk_angle = entity.angle;
        integrate(&mut entity, DT);
        let paused_at = entity.position;

        begin_swipe_left(&mut entity, Vec2::new(100.0, 0.0), DT);
        tick_until(&mut entity, 200, |e| !e.is_attacking());

        assert_eq!(entity.position, paused_at);
        assert_eq!(entity.angle, walk_angle);
        assert_eq!(entity.end_movement_position(), Some(Vec2::new(0.0, 300.0)));

        tick_until(&mut entity, 400, |e| e.motion == MotionState::Idle);
        assert!(within_tolerance(entity.position, Vec2::new(0.0, 300.0)));
    }

    #[test]
    fn commands_are_ignored_while_attacking() {
        let mut entity = player_at(Vec2::ZERO);
        begin_swipe_left(&mut entity, Vec2::new(100.0, 0.0), DT);
        let snapshot = entity.clone();

        assert!(!order_move(&mut entity, Vec2::new(-50.0, 0.0)));
        assert!(!begin_swipe_left(&mut entity, Vec2::new(0.0, 100.0), DT));
        assert_eq!(entity, snapshot);
    }

    #[test]
    fn degenerate_swipe_has_zero_rate_and_ends_next_tick() {
        let mut entity = player_at(Vec2::new(30.0, 30.0));
        begin_swipe_left(&mut entity, Vec2::new(30.0, 30.0), DT);
        assert_eq!(entity.attack_omega(), 0.0);
        assert_eq!(entity.position, Vec2::new(30.0, 30.0));

        assert_eq!(
            resolve_arrival(&mut entity),
            Some(MotionEvent::SwipeFinished(SwipeKind::Left))
        );
        assert!(!entity.is_attacking());

        let mut statless = Entity::new(EntityArchetype::Goblin, TextureId::Goblin, Vec2::ZERO);
        begin_swipe_left(&mut statless, Vec2::new(10.0, 0.0), 0.0);
        assert_eq!(statless.attack_omega(), 0.0);
    }

    #[test]
    fn world_passes_resolve_and_integrate_every_live_entity() {
        let mut world = World::new();
        let walker = world.create(player_at(Vec2::ZERO)).expect("create");
        let idle = world
            .create(Entity::new(EntityArchetype::Goblin, TextureId::Goblin, Vec2::new(5.0, 5.0)))
            .expect("create");
        order_move(world.get_mut(walker).expect("walker"), Vec2::new(2.0, 0.0));

        integrate_all(&mut world, DT);
        assert!(world.get(walker).expect("walker").position.x > 0.0);
        assert_eq!(world.get(idle).expect("idle").position, Vec2::new(5.0, 5.0));

        let events = resolve_arrivals(&mut world);
        assert_eq!(events, vec![(walker, MotionEvent::WalkArrived)]);
        assert!(resolve_arrivals(&mut world).is_empty());
    }
}
