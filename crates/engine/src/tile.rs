//! Conversions between continuous world coordinates and the square tile grid.
//!
//! Tile `(x, y)` is centred on world point `(x * TILE_WIDTH, y * TILE_WIDTH)`;
//! world points round to the nearest tile, halves away from zero.

use crate::geometry::Vec2;

/// World units per tile edge.
pub const TILE_WIDTH: f32 = 15.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

pub fn world_to_tile(world: f32) -> i32 {
    (world / TILE_WIDTH).round() as i32
}

pub fn tile_to_world(tile: i32) -> f32 {
    tile as f32 * TILE_WIDTH
}

pub fn world_to_tile_pos(world: Vec2) -> TilePos {
    TilePos {
        x: world_to_tile(world.x),
        y: world_to_tile(world.y),
    }
}

pub fn tile_pos_to_world(tile: TilePos) -> Vec2 {
    Vec2 {
        x: tile_to_world(tile.x),
        y: tile_to_world(tile.y),
    }
}

/// Rounds a world point to the nearest grid intersection.
pub fn snap_to_tile_grid(world: Vec2) -> Vec2 {
    tile_pos_to_world(world_to_tile_pos(world))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_to_tile_rounds_to_nearest() {
        assert_eq!(world_to_tile(0.0), 0);
        assert_eq!(world_to_tile(7.0), 0);
        assert_eq!(world_to_tile(8.0), 1);
        assert_eq!(world_to_tile(-8.0), -1);
        assert_eq!(world_to_tile(44.0), 3);
    }

    #[test]
    fn half_tile_ties_round_away_from_zero() {
        assert_eq!(world_to_tile(7.5), 1);
        assert_eq!(world_to_tile(-7.5), -1);
    }

    #[test]
    fn tile_round_trip_is_identity() {
        for tile in -500..=500 {
            assert_eq!(world_to_tile(tile_to_world(tile)), tile, "tile={tile}");
        }
    }

    #[test]
    fn snapping_is_idempotent() {
        let samples = [
            Vec2::new(0.0, 0.0),
            Vec2::new(7.49, -7.51),
            Vec2::new(-199.0, 200.0),
            Vec2::new(123.456, -98.7),
            Vec2::new(1e5, -3.3e4),
        ];
        for point in samples {
            let once = snap_to_tile_grid(point);
            let twice = snap_to_tile_grid(once);
            assert_eq!(once, twice, "point={point:?}");
        }
    }

    #[test]
    fn snapped_points_are_grid_multiples() {
        let snapped = snap_to_tile_grid(Vec2::new(23.0, -37.0));
        assert_eq!(snapped, Vec2::new(30.0, -30.0));
        assert_eq!(world_to_tile_pos(snapped), TilePos::new(2, -2));
    }
}
