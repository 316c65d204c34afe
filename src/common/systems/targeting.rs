//! Target Finder
//!
//! Scans the high-detail actors around the player and ranks the eligible ones
//! for lock-on.
//!
//! # Design
//!
//! Every candidate is measured from the camera, not from the player:
//! - `azimuth` is the heading to the candidate relative to the camera heading
//! - `elevation` is the down-positive pitch to the candidate relative to the
//!   camera pitch
//!
//! Candidates whose azimuth falls outside half the camera's field of view are
//! dropped. The cone is widened by half again for the directional orderings so
//! that switching left or right can reach actors just off screen.
//!
//! # Orderings
//!
//! - `CameraDistance`: nearest to the camera first
//! - `CharacterDistanceAndCrosshair`: player distance plus angular distance
//!   from the crosshair
//! - `Crosshair`: angular distance from the crosshair alone
//! - `ZAxisClockwise`: first actor to the right of the crosshair, then on
//!   around the circle
//! - `ZAxisCounterClockwise`: the same, towards the left

use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::{
    angle::*,
    host::*,
    resources::config::Config,
    state::target_lock::TargetLockState,
    systems::{camera::camera_rotation, validation::*},
};

/// Ranking policy for [`find_candidates`]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TargetSortOrder {
    CameraDistance,
    CharacterDistanceAndCrosshair,
    Crosshair,
    ZAxisClockwise,
    ZAxisCounterClockwise,
}

impl TargetSortOrder {
    /// Orderings used to cycle targets sideways.
    pub fn is_directional(self) -> bool {
        matches!(self, TargetSortOrder::ZAxisClockwise | TargetSortOrder::ZAxisCounterClockwise)
    }
}

/// Half-angle of the candidate cone for a field of view given in degrees.
pub fn fov_threshold(fov_degrees: f32, order: TargetSortOrder) -> f32 {
    let threshold = fov_degrees / 180.0 * FRAC_PI_2;
    if order.is_directional() { threshold * 1.5 } else { threshold }
}

/// Eligible actors in front of the camera, ranked by `order`.
///
/// `max_distance` is scaled per actor by its race size; a non-positive value
/// disables the distance check. Ties keep the host's actor order.
pub fn find_candidates<H: ActorQuery + CameraQuery + ?Sized>(
    host: &H,
    config: &Config,
    max_distance: f32,
    order: TargetSortOrder,
) -> Vec<Entity> {
    let Some(player) = host.player() else { return Vec::new() };
    let Some(player_actor) = host.actor(player) else { return Vec::new() };
    let Some(camera_pos) = host.position() else { return Vec::new() };

    let (camera_yaw, camera_pitch) = camera_rotation(host.mode(), &player_actor);
    let threshold = fov_threshold(host.fov(), order);

    let mut scored: Vec<(f32, Entity)> = Vec::new();
    for ent in host.high_actors() {
        if !is_valid_target(host, config, ent, false) {
            continue;
        }
        let Some(actor) = host.actor(ent) else { continue };

        let delta = actor.position - camera_pos;
        let camera_distance = delta.length();
        let distance = max_distance * race_size_multiplier(config, actor.race_size);
        if distance > 0.0 && camera_distance > distance {
            continue;
        }

        let heading = direction_to_heading(delta.truncate());
        let azimuth = normalize_relative(heading - camera_yaw);
        let elevation = normalize_relative(-delta.z.atan2(delta.truncate().length()) - camera_pitch);
        if azimuth.abs() >= threshold {
            continue;
        }

        let crosshair_distance = (azimuth * azimuth + elevation * elevation).sqrt();
        let key = match order {
            TargetSortOrder::CameraDistance => camera_distance,
            TargetSortOrder::CharacterDistanceAndCrosshair => {
                actor.position.distance(player_actor.position) + crosshair_distance
            }
            TargetSortOrder::Crosshair => crosshair_distance,
            TargetSortOrder::ZAxisClockwise => normalize_absolute(heading - camera_yaw),
            TargetSortOrder::ZAxisCounterClockwise => TAU - normalize_absolute(heading - camera_yaw),
        };

        if key >= 0.0 {
            scored.push((key, ent));
        }
    }

    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, ent)| ent).collect()
}

/// Best new target for lock-on.
///
/// An actor under the crosshair wins outright when it is valid and is not the
/// current hard target; otherwise the top-ranked candidate other than the
/// current hard target.
pub fn find_target<H: ActorQuery + CameraQuery + ?Sized>(
    lock: &TargetLockState,
    host: &H,
    config: &Config,
    max_distance: f32,
    order: TargetSortOrder,
) -> Option<Entity> {
    let current = lock.hard_target();

    if let Some(hovered) = host.crosshair_actor() {
        if Some(hovered) != current && is_valid_target(host, config, hovered, false) {
            return Some(hovered);
        }
    }

    first_other(find_candidates(host, config, max_distance, order), current)
}

/// Next target to the right (`right`) or left of the crosshair.
pub fn find_next_target<H: ActorQuery + CameraQuery + ?Sized>(
    lock: &TargetLockState,
    host: &H,
    config: &Config,
    max_distance: f32,
    right: bool,
) -> Option<Entity> {
    let order = if right { TargetSortOrder::ZAxisClockwise } else { TargetSortOrder::ZAxisCounterClockwise };
    first_other(find_candidates(host, config, max_distance, order), lock.hard_target())
}

/// Target nearest to the camera.
pub fn find_closest_target<H: ActorQuery + CameraQuery + ?Sized>(
    lock: &TargetLockState,
    host: &H,
    config: &Config,
    max_distance: f32,
) -> Option<Entity> {
    first_other(find_candidates(host, config, max_distance, TargetSortOrder::CameraDistance), lock.hard_target())
}

fn first_other(candidates: Vec<Entity>, current: Option<Entity>) -> Option<Entity> {
    candidates.into_iter().find(|&ent| Some(ent) != current)
}

/// Heading from `from` to `to` on the XY plane, or `None` when they coincide.
pub fn heading_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let delta = (to - from).truncate();
    if delta.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(direction_to_heading(delta))
}

/// Down-positive pitch that looks from `from` at `to`.
pub fn pitch_towards(from: Vec3, to: Vec3) -> f32 {
    -elevation(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::arena::Arena;

    fn at_azimuth(degrees: f32, distance: f32) -> Vec3 {
        (heading_to_direction(degrees.to_radians()) * distance).extend(0.0)
    }

    /// Arena with the camera at the player looking down +Y
    fn arena_with_fov(fov: f32) -> Arena {
        let mut arena = Arena::default();
        arena.camera_position = Some(Vec3::ZERO);
        arena.fov = fov;
        arena
    }

    #[test]
    fn test_crosshair_order_inside_fov() {
        let mut arena = arena_with_fov(45.0);
        let left = arena.spawn_hostile(at_azimuth(-10.0, 500.0));
        let right = arena.spawn_hostile(at_azimuth(5.0, 500.0));
        let wide = arena.spawn_hostile(at_azimuth(40.0, 500.0));

        let found = find_candidates(&arena, &Config::default(), 2000.0, TargetSortOrder::Crosshair);
        assert_eq!(found, vec![right, left]);
        assert!(!found.contains(&wide));
    }

    #[test]
    fn test_directional_orders_widen_cone() {
        assert!((fov_threshold(45.0, TargetSortOrder::Crosshair) - 22.5_f32.to_radians()).abs() < 1e-5);
        assert!((fov_threshold(45.0, TargetSortOrder::ZAxisClockwise) - 33.75_f32.to_radians()).abs() < 1e-5);

        let mut arena = arena_with_fov(45.0);
        let edge = arena.spawn_hostile(at_azimuth(30.0, 500.0));
        let config = Config::default();
        assert!(find_candidates(&arena, &config, 2000.0, TargetSortOrder::Crosshair).is_empty());
        assert_eq!(find_candidates(&arena, &config, 2000.0, TargetSortOrder::ZAxisClockwise), vec![edge]);
    }

    #[test]
    fn test_clockwise_orders_rightward() {
        let mut arena = arena_with_fov(90.0);
        let far_left = arena.spawn_hostile(at_azimuth(-40.0, 500.0));
        let near_left = arena.spawn_hostile(at_azimuth(-5.0, 500.0));
        let near_right = arena.spawn_hostile(at_azimuth(10.0, 500.0));
        let far_right = arena.spawn_hostile(at_azimuth(50.0, 500.0));
        let config = Config::default();

        let clockwise = find_candidates(&arena, &config, 2000.0, TargetSortOrder::ZAxisClockwise);
        assert_eq!(clockwise, vec![near_right, far_right, far_left, near_left]);

        let counter = find_candidates(&arena, &config, 2000.0, TargetSortOrder::ZAxisCounterClockwise);
        assert_eq!(counter, vec![near_left, far_left, far_right, near_right]);
    }

    #[test]
    fn test_camera_distance_and_limits() {
        let mut arena = arena_with_fov(90.0);
        let far = arena.spawn_hostile(at_azimuth(0.0, 1500.0));
        let near = arena.spawn_hostile(at_azimuth(5.0, 300.0));
        let config = Config::default();

        assert_eq!(find_candidates(&arena, &config, 2000.0, TargetSortOrder::CameraDistance), vec![near, far]);
        assert_eq!(find_candidates(&arena, &config, 1000.0, TargetSortOrder::CameraDistance), vec![near]);
        // Non-positive distance means unlimited
        assert_eq!(find_candidates(&arena, &config, 0.0, TargetSortOrder::CameraDistance).len(), 2);
    }

    #[test]
    fn test_elevation_counts_for_crosshair() {
        let mut arena = arena_with_fov(90.0);
        let high = arena.spawn_hostile(Vec3::new(0.0, 500.0, 300.0));
        let level = arena.spawn_hostile(at_azimuth(10.0, 500.0));

        let found = find_candidates(&arena, &Config::default(), 2000.0, TargetSortOrder::Crosshair);
        assert_eq!(found, vec![level, high]);
    }

    #[test]
    fn test_find_target_prefers_crosshair_actor() {
        let mut arena = arena_with_fov(90.0);
        let centered = arena.spawn_hostile(at_azimuth(0.0, 500.0));
        let hovered = arena.spawn_hostile(at_azimuth(30.0, 500.0));
        arena.crosshair = Some(hovered);

        let mut lock = TargetLockState::new();
        let config = Config::default();
        assert_eq!(find_target(&lock, &arena, &config, 2000.0, TargetSortOrder::Crosshair), Some(hovered));

        // Hovering the current target falls back to the ranked list
        lock.lock(hovered);
        assert_eq!(find_target(&lock, &arena, &config, 2000.0, TargetSortOrder::Crosshair), Some(centered));
    }

    #[test]
    fn test_wrappers_skip_current_target() {
        let mut arena = arena_with_fov(90.0);
        let current = arena.spawn_hostile(at_azimuth(0.0, 400.0));
        let right = arena.spawn_hostile(at_azimuth(20.0, 500.0));
        let left = arena.spawn_hostile(at_azimuth(-20.0, 600.0));

        let mut lock = TargetLockState::new();
        lock.lock(current);
        let config = Config::default();

        assert_eq!(find_next_target(&lock, &arena, &config, 2000.0, true), Some(right));
        assert_eq!(find_next_target(&lock, &arena, &config, 2000.0, false), Some(left));
        assert_eq!(find_closest_target(&lock, &arena, &config, 2000.0), Some(right));
    }

    #[test]
    fn test_no_actors_no_candidates() {
        let arena = arena_with_fov(90.0);
        let lock = TargetLockState::new();
        assert!(find_candidates(&arena, &Config::default(), 2000.0, TargetSortOrder::Crosshair).is_empty());
        assert_eq!(find_target(&lock, &arena, &Config::default(), 2000.0, TargetSortOrder::Crosshair), None);
    }

    #[test]
    fn test_heading_and_pitch_towards() {
        assert!((heading_towards(Vec3::ZERO, Vec3::X).unwrap() - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(heading_towards(Vec3::ONE, Vec3::ONE), None);
        // Target below: positive (down) pitch
        assert!(pitch_towards(Vec3::ZERO, Vec3::new(0.0, 1.0, -1.0)) > 0.0);
    }
}
