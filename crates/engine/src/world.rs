use std::cmp::Reverse;
use std::collections::BinaryHeap;

use thiserror::Error;
use tracing::warn;

use crate::geometry::Vec2;
use crate::motion::{MotionState, SwipeKind};
use crate::texture::TextureId;

/// Slot count of the default [`World`].
pub const MAX_ENTITY_COUNT: usize = 1024;

/// Slot index of a live entity. Stable for the entity's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityArchetype {
    Player,
    Goblin,
    Troll,
}

impl EntityArchetype {
    pub const ALL: [EntityArchetype; 3] = [Self::Player, Self::Goblin, Self::Troll];

    pub fn token(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Goblin => "goblin",
            Self::Troll => "troll",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|archetype| archetype.token() == token)
    }
}

/// Speeds are world units per second, range is world units.
/// `health` and `damage` are carried but not consumed by the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CombatStats {
    pub movement_speed: f32,
    pub attack_speed: f32,
    pub attack_range: f32,
    pub health: i32,
    pub damage: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub archetype: EntityArchetype,
    pub texture: TextureId,
    pub position: Vec2,
    /// Facing in degrees.
    pub angle: f32,
    pub stats: CombatStats,
    pub motion: MotionState,
}

impl Entity {
    pub fn new(archetype: EntityArchetype, texture: TextureId, position: Vec2) -> Self {
        Self {
            archetype,
            texture,
            position,
            angle: 0.0,
            stats: CombatStats::default(),
            motion: MotionState::Idle,
        }
    }

    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.motion, MotionState::Attacking(_))
    }

    pub fn attack(&self) -> Option<SwipeKind> {
        match &self.motion {
            MotionState::Attacking(swipe) => Some(swipe.kind),
            _ => None,
        }
    }

    /// Direction driving walk integration; zero unless walking.
    pub fn input_axis(&self) -> Vec2 {
        match &self.motion {
            MotionState::Walking(walk) => walk.axis,
            _ => Vec2::ZERO,
        }
    }

    /// Walk target, present only while the walk is driving the entity.
    /// A walk suspended by a swipe is not reported here.
    pub fn end_movement_position(&self) -> Option<Vec2> {
        match &self.motion {
            MotionState::Walking(walk) => Some(walk.target),
            _ => None,
        }
    }

    pub fn attack_input_axis(&self) -> Vec2 {
        match &self.motion {
            MotionState::Attacking(swipe) => swipe.axis,
            _ => Vec2::ZERO,
        }
    }

    pub fn end_attack_position(&self) -> Option<Vec2> {
        match &self.motion {
            MotionState::Attacking(swipe) => Some(swipe.end_position),
            _ => None,
        }
    }

    pub fn before_attack_position(&self) -> Option<Vec2> {
        match &self.motion {
            MotionState::Attacking(swipe) => Some(swipe.return_position),
            _ => None,
        }
    }

    pub fn angle_before_attack(&self) -> Option<f32> {
        match &self.motion {
            MotionState::Attacking(swipe) => Some(swipe.return_angle),
            _ => None,
        }
    }

    /// Degrees per reference tick; zero unless attacking.
    pub fn attack_omega(&self) -> f32 {
        match &self.motion {
            MotionState::Attacking(swipe) => swipe.angular_rate,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("entity pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },
}

/// Fixed-capacity entity pool.
///
/// Slots never move. `create` hands out the lowest free slot index, and
/// iteration visits live entities in ascending slot order.
#[derive(Debug)]
pub struct World {
    slots: Box<[Option<Entity>]>,
    free_slots: BinaryHeap<Reverse<usize>>,
    high_water: usize,
    live_count: usize,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTITY_COUNT)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            free_slots: BinaryHeap::new(),
            high_water: 0,
            live_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.live_count
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    pub fn create(&mut self, entity: Entity) -> Result<EntityId, WorldError> {
        // Freed slots are always below the high-water mark, so the heap
        // minimum is the first free index overall.
        let index = if let Some(Reverse(index)) = self.free_slots.pop() {
            index
        } else if self.high_water < self.slots.len() {
            self.high_water += 1;
            self.high_water - 1
        } else {
            warn!(capacity = self.capacity(), "entity_pool_exhausted");
            return Err(WorldError::PoolExhausted {
                capacity: self.capacity(),
            });
        };

        self.slots[index] = Some(entity);
        self.live_count += 1;
        Ok(EntityId(index))
    }

    /// Clears the slot. Returns false if it held no live entity.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slots.get_mut(id.0) else {
            return false;
        };
        if slot.take().is_none() {
            return false;
        }
        self.free_slots.push(Reverse(id.0));
        self.live_count -= 1;
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.slots[..self.high_water]
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entity| (EntityId(index), entity)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> + '_ {
        self.slots[..self.high_water]
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|entity| (EntityId(index), entity)))
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.free_slots.clear();
        self.high_water = 0;
        self.live_count = 0;
    }
}
