//! Target Validation
//!
//! Two predicates over an actor's transient state:
//! - [`is_valid_target`] decides whether an actor may *become* a target
//! - [`check_current_target`] decides whether an already committed target
//!   may *stay* one, with distance hysteresis and a line-of-sight grace timer
//!
//! Neither panics on a stale handle; an actor that fails to resolve is simply
//! not a target.

use bevy::prelude::*;

use crate::common::{
    host::*,
    resources::config::Config,
    state::target_lock::TargetLockState,
};

/// Lock-on distance factor for a race size class.
pub fn race_size_multiplier(config: &Config, size: RaceSize) -> f32 {
    match size {
        RaceSize::Small => config.target_lock_distance_multiplier_small,
        RaceSize::Medium => 1.0,
        RaceSize::Large => config.target_lock_distance_multiplier_large,
        RaceSize::ExtraLarge => config.target_lock_distance_multiplier_extra_large,
    }
}

/// Maximum lock-on distance for `actor`, before any hysteresis.
pub fn lock_distance_for(config: &Config, actor: &ActorSnapshot) -> f32 {
    config.target_lock_distance * race_size_multiplier(config, actor.race_size)
}

/// Whether `ent` is eligible as a new hard or soft target.
///
/// Rejects the player, the player's mount, non-character forms, downed or
/// invisible actors, non-hostile actors when configured, and anything the
/// player cannot see. The distance check is optional because candidate
/// scans apply their own distance against the camera.
pub fn is_valid_target<H: ActorQuery + ?Sized>(
    host: &H,
    config: &Config,
    ent: Entity,
    check_distance: bool,
) -> bool {
    let Some(player) = host.player() else { return false };
    if ent == player {
        return false;
    }
    let Some(player_state) = host.player_state() else { return false };
    if player_state.mount == Some(ent) {
        return false;
    }
    let Some(actor) = host.actor(ent) else { return false };
    if actor.kind != ActorKind::Character || actor.is_downed() {
        return false;
    }

    if check_distance {
        let Some(player_actor) = host.actor(player) else { return false };
        if actor.position.distance(player_actor.position) > lock_distance_for(config, &actor) {
            return false;
        }
    }

    if actor.invisibility > 0.0 {
        return false;
    }
    if config.target_lock_hostile_actors_only && !actor.hostile_to_player {
        return false;
    }

    host.has_line_of_sight(player, ent)
}

/// Whether a committed target should stay committed this frame.
///
/// Distance is widened by the configured hysteresis factor. With
/// `instant_los` a single failed line-of-sight test rejects; otherwise the
/// target survives until `lock.los_timer` runs out. The timer is refilled to
/// the grace period on the first check after lock-on and whenever sight is
/// regained.
pub fn check_current_target<H: ActorQuery + DialogueQuery + ?Sized>(
    lock: &mut TargetLockState,
    host: &H,
    config: &Config,
    target: Option<Entity>,
    instant_los: bool,
) -> bool {
    let Some(target) = target else { return false };
    let Some(actor) = host.actor(target) else { return false };
    let Some(player) = host.player() else { return false };
    let Some(player_actor) = host.actor(player) else { return false };

    if !actor.active || actor.is_downed() || actor.invisibility > 0.0 {
        return false;
    }

    let max_distance = lock_distance_for(config, &actor) * config.target_lock_distance_hysteresis;
    if actor.position.distance(player_actor.position) > max_distance {
        return false;
    }

    if host.speaker().is_some() {
        return false;
    }

    if host.player_state().and_then(|p| p.mount) == Some(target) {
        return false;
    }

    if !config.target_lock_test_los {
        return true;
    }

    let has_los = host.has_line_of_sight(player, target);
    if instant_los {
        return has_los;
    }

    let first_check = lock.los_timer.is_none();
    if has_los || first_check {
        lock.los_timer = Some(config.target_lock_los_grace);
    }
    if !first_check && lock.los_timer.is_some_and(|t| t <= 0.0) {
        debug!("target {target:?} out of sight past the grace period");
        return false;
    }

    true
}
