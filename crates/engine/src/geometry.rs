use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Unit vector with the same direction. The zero vector stays zero.
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length > 0.0 {
            let inv_length = 1.0 / length;
            Self {
                x: self.x * inv_length,
                y: self.y * inv_length,
            }
        } else {
            self
        }
    }

    /// Quarter turn: `(x, y) -> (-y, x)`.
    pub fn perpendicular(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Direction of `self` in degrees, measured from +x toward +y.
    pub fn angle_degrees(self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Axis-aligned box spanned by two corners.
///
/// Constructors do not order the corners. `size` tolerates either order,
/// `contains` expects `min <= max` on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range2f {
    pub min: Vec2,
    pub max: Vec2,
}

impl Range2f {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box of `size` whose anchor corner sits on the origin; it extends
    /// toward +x/+y from there.
    pub fn bottom_center(size: Vec2) -> Self {
        Self::new(Vec2::ZERO, size)
    }

    /// Box of `size` centred on the origin.
    pub fn center_center(size: Vec2) -> Self {
        Self::new(Vec2::ZERO, size).shifted(Vec2 {
            x: -(size.x / 2.0),
            y: -(size.y / 2.0),
        })
    }

    pub fn shifted(self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    pub fn size(self) -> Vec2 {
        let delta = self.min - self.max;
        Vec2 {
            x: delta.x.abs(),
            y: delta.y.abs(),
        }
    }

    pub fn contains(self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_center_contains_far_corner_but_not_past_it() {
        let size = Vec2::new(16.0, 24.0);
        let range = Range2f::bottom_center(size);

        assert!(range.contains(size));
        assert!(range.contains(Vec2::ZERO));
        assert!(!range.contains(Vec2::new(size.x + 0.01, size.y)));
        assert!(!range.contains(Vec2::new(-0.01, 0.0)));
    }

    #[test]
    fn center_center_straddles_origin() {
        let range = Range2f::center_center(Vec2::new(10.0, 4.0));

        assert_eq!(range.min, Vec2::new(-5.0, -2.0));
        assert_eq!(range.max, Vec2::new(5.0, 2.0));
        assert!(range.contains(Vec2::ZERO));
    }

    #[test]
    fn shift_moves_both_corners() {
        let range = Range2f::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, 5.0))
            .shifted(Vec2::new(-1.0, 10.0));

        assert_eq!(range.min, Vec2::new(0.0, 12.0));
        assert_eq!(range.max, Vec2::new(2.0, 15.0));
        assert_eq!(range.size(), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn size_ignores_corner_order() {
        let range = Range2f::new(Vec2::new(4.0, 9.0), Vec2::new(1.0, 2.0));
        assert_eq!(range.size(), Vec2::new(3.0, 7.0));
    }

    #[test]
    fn normalizing_zero_vector_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let unit = Vec2::new(3.0, 4.0).normalized();
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn perpendicular_is_quarter_turn() {
        assert_eq!(Vec2::new(1.0, 0.0).perpendicular(), Vec2::new(-0.0, 1.0));
        assert_eq!(Vec2::new(0.0, 2.0).perpendicular(), Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn angle_degrees_follows_atan2() {
        assert!((Vec2::new(1.0, 0.0).angle_degrees()).abs() < 1e-6);
        assert!((Vec2::new(0.0, 1.0).angle_degrees() - 90.0).abs() < 1e-4);
        assert!((Vec2::new(-1.0, 0.0).angle_degrees() - 180.0).abs() < 1e-4);
    }
}
