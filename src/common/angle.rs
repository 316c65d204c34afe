//! Pure Angle and Vector Functions
//!
//! Every heading in this crate follows one convention:
//! - World space is Z-up; headings are measured on the XY plane
//! - Heading 0 faces +Y, heading π/2 faces +X (clockwise when seen from above)
//! - Pitch is positive when looking down
//!
//! These functions hold no state and never fail.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

/// Smallest rotation the controller still bothers to apply.
pub const NEGLIGIBLE_ANGLE: f32 = f32::EPSILON;

/// Wrap an angle into `[0, 2π)`.
pub fn normalize_absolute(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Wrap an angle into `(-π, π]`.
pub fn normalize_relative(angle: f32) -> f32 {
    let wrapped = normalize_absolute(angle);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Unit vector on the XY plane pointing along `heading`.
pub fn heading_to_direction(heading: f32) -> Vec2 {
    Vec2::new(heading.sin(), heading.cos())
}

/// Heading of a vector on the XY plane. The zero vector maps to heading 0.
pub fn direction_to_heading(direction: Vec2) -> f32 {
    direction.x.atan2(direction.y)
}

/// Rotate a vector so that its heading increases by `angle`.
pub fn rotate_heading(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos + v.y * sin, -v.x * sin + v.y * cos)
}

/// Signed heading change that turns `from` onto `to`, in `(-π, π]`.
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    normalize_relative(direction_to_heading(to) - direction_to_heading(from))
}

/// Clamp an angle delta into `[min, max]`.
pub fn clip_angle(angle: f32, min: f32, max: f32) -> f32 {
    angle.clamp(min, max)
}

/// Fraction of the remaining distance to cover this frame for exponential approach.
///
/// Frame-rate independent: `value += (target - value) * (1 - exp(-speed * dt))`.
pub fn exp_lerp_factor(speed: f32, dt: f32) -> f32 {
    1.0 - (-speed * dt).exp()
}

/// Move `current` toward `target` with exponential decay.
///
/// A non-positive speed snaps straight to the target.
pub fn interp_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }

    let distance = target - current;
    if distance * distance < 1e-8 {
        return target;
    }

    current + distance * exp_lerp_factor(speed, dt).clamp(0.0, 1.0)
}

/// Angular version of [`interp_to`] that always takes the short way around.
pub fn interp_angle_to(current: f32, target: f32, dt: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return normalize_relative(target);
    }

    let distance = normalize_relative(target - current);
    if distance * distance < 1e-8 {
        return normalize_relative(target);
    }

    normalize_relative(current + distance * exp_lerp_factor(speed, dt).clamp(0.0, 1.0))
}

/// Projection of `v` onto `onto`. Projecting onto the zero vector yields zero.
pub fn project(v: Vec3, onto: Vec3) -> Vec3 {
    let length_sq = onto.length_squared();
    if length_sq <= f32::EPSILON {
        return Vec3::ZERO;
    }
    onto * (v.dot(onto) / length_sq)
}

/// Elevation of a vector above the XY plane (positive = up).
pub fn elevation(v: Vec3) -> f32 {
    v.z.atan2(v.truncate().length())
}

/// Unit vector for a heading and a down-positive pitch.
pub fn look_direction(heading: f32, pitch: f32) -> Vec3 {
    let (sin_p, cos_p) = pitch.sin_cos();
    let flat = heading_to_direction(heading) * cos_p;
    Vec3::new(flat.x, flat.y, -sin_p)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn test_normalize_relative_range() {
        for i in -720..=720 {
            let a = (i as f32).to_radians();
            let n = normalize_relative(a);
            assert!(n > -PI - TOLERANCE && n <= PI + TOLERANCE, "{a} -> {n}");
            // Same direction as the input
            assert!((n.sin() - a.sin()).abs() < 1e-4);
            assert!((n.cos() - a.cos()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_normalize_absolute_range() {
        assert_eq!(normalize_absolute(0.0), 0.0);
        assert!((normalize_absolute(-PI / 2.0) - 3.0 * PI / 2.0).abs() < TOLERANCE);
        assert!(normalize_absolute(-1e-9) < TAU);
        assert!((normalize_absolute(5.0 * PI) - PI).abs() < 1e-4);
    }

    #[test]
    fn test_heading_round_trip_cardinals() {
        assert!((heading_to_direction(0.0) - Vec2::Y).length() < TOLERANCE);
        assert!((heading_to_direction(PI / 2.0) - Vec2::X).length() < TOLERANCE);
        assert!((direction_to_heading(Vec2::X) - PI / 2.0).abs() < TOLERANCE);
        assert!((direction_to_heading(Vec2::NEG_X) + PI / 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_rotate_heading_adds_angle() {
        let v = Vec2::new(0.0, 2.0);
        let rotated = rotate_heading(v, PI / 2.0);
        assert!((rotated - Vec2::new(2.0, 0.0)).length() < TOLERANCE);
        // Length is preserved
        assert!((rotate_heading(Vec2::new(0.3, -0.4), 1.2).length() - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_angle_between_is_shortest_signed() {
        let a = heading_to_direction(170_f32.to_radians());
        let b = heading_to_direction(-170_f32.to_radians());
        assert!((angle_between(a, b) - 20_f32.to_radians()).abs() < 1e-4);
        assert!((angle_between(b, a) + 20_f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_interp_to_approaches_without_overshoot() {
        let mut value = 0.0;
        for _ in 0..100 {
            let next = interp_to(value, 10.0, 1.0 / 60.0, 5.0);
            assert!(next >= value && next <= 10.0);
            value = next;
        }
        assert!(value > 9.9);
    }

    #[test]
    fn test_interp_to_non_positive_speed_snaps() {
        assert_eq!(interp_to(1.0, 4.0, 0.016, 0.0), 4.0);
        assert_eq!(interp_to(1.0, 4.0, 0.016, -2.0), 4.0);
    }

    #[test]
    fn test_interp_angle_to_wraps_short_way() {
        let current = 170_f32.to_radians();
        let target = -170_f32.to_radians();
        let next = interp_angle_to(current, target, 0.1, 5.0);
        // Moved forward across the seam rather than back through zero
        let moved = normalize_relative(next - current);
        assert!(moved > 0.0 && moved < 20_f32.to_radians());
    }

    #[test]
    fn test_project_onto_axis() {
        let p = project(Vec3::new(3.0, 4.0, 5.0), Vec3::new(0.0, 2.0, 0.0));
        assert!((p - Vec3::new(0.0, 4.0, 0.0)).length() < TOLERANCE);
        assert_eq!(project(Vec3::ONE, Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_look_direction_matches_elevation() {
        let dir = look_direction(0.3, 0.4);
        assert!((dir.length() - 1.0).abs() < TOLERANCE);
        // Down-positive pitch means negative elevation
        assert!((elevation(dir) + 0.4).abs() < TOLERANCE);
        assert!((direction_to_heading(dir.truncate()) - 0.3).abs() < TOLERANCE);
    }
}
