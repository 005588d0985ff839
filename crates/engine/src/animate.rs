use crate::geometry::Vec2;

/// Distance at which an animated value snaps onto its target.
pub const SNAP_EPSILON: f32 = 0.001;

pub fn almost_equals(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

/// Exponential ease of `current` toward `target`.
///
/// Each call closes `1 - 2^(-rate * dt)` of the remaining gap, so the
/// trajectory does not depend on how the elapsed time is split into steps.
/// Returns the new value and whether it has reached (and snapped onto)
/// `target`. A step too small to change the value any more also snaps.
pub fn animate_toward(current: f32, target: f32, dt: f32, rate: f32) -> (f32, bool) {
    let blend = 1.0 - (-rate * dt).exp2();
    let next = current + (target - current) * blend;
    let stalled = blend > 0.0 && next == current;
    if almost_equals(next, target, SNAP_EPSILON) || stalled {
        (target, true)
    } else {
        (next, false)
    }
}

/// Per-axis [`animate_toward`]; reached only once both axes have.
pub fn animate_toward_vec2(current: Vec2, target: Vec2, dt: f32, rate: f32) -> (Vec2, bool) {
    let (x, reached_x) = animate_toward(current.x, target.x, dt, rate);
    let (y, reached_y) = animate_toward(current.y, target.y, dt, rate);
    (Vec2 { x, y }, reached_x && reached_y)
}
