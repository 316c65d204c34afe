//! Rotation Controller
//!
//! Turns the desired heading into an actual per-frame rotation.
//!
//! # Free-facing mode
//!
//! The character turns towards [`DesiredAngle`] at a speed picked from the
//! current context; the camera's free-look yaw is counter-rotated by the same
//! amount so the view holds still while the body turns under it.
//!
//! Speed model (rad/s, starting from π):
//! - turning to the crosshair: face-crosshair multiplier
//! - otherwise start from the movement type's rate when the host knows it, then
//!   - airborne: air multiplier, absolute
//!   - melee swing: attack start/mid/end multiplier, absolute
//!   - sprinting: sprint multiplier, relative
//!   - anything else: run multiplier, relative
//!
//! A relative speed also scales with the size of the remaining turn, so large
//! turns close faster. A non-positive multiplier means no rotation at all.
//!
//! # Locked-camera mode
//!
//! When the camera is not free, the character is steered straight at the hard
//! target with exponential interpolation, and [`look_at_target`] steers the
//! camera's free look instead.
//!
//! [`DesiredAngle`]: crate::common::state::rotation::DesiredAngle

use std::f32::consts::{FRAC_PI_4, PI};

use bevy::prelude::*;

use crate::common::{
    angle::*,
    host::*,
    resources::config::{Config, DialogueMode},
    state::{attack::AttackState, rotation::RotationContext, ControllerState},
    systems::targeting::{heading_towards, pitch_towards},
};

/// Snapshot the rotation-relevant parts of this frame.
pub fn rotation_context(state: &ControllerState, player: &PlayerState) -> RotationContext {
    RotationContext {
        attack_state: state.attack_state,
        melee_attacking: player.attack.is_melee(),
        sprinting: player.sprinting,
        airborne: player.airborne,
        transformed: player.transformed,
        movement_rotation_rate: player.movement_rotation_rate,
    }
}

/// Rotation speed for this frame and whether it scales with the turn size.
pub fn rotation_speed(ctx: &RotationContext, config: &Config, turning_to_crosshair: bool) -> (f32, bool) {
    if turning_to_crosshair {
        return (PI * config.face_crosshair_rotation_speed_multiplier, true);
    }

    let base = ctx.movement_rotation_rate.unwrap_or(PI);
    let skip_attack = config.disable_attack_rotation_multipliers_for_transformations && ctx.transformed;

    if ctx.airborne {
        (base * config.air_rotation_speed_mult, false)
    } else if ctx.melee_attacking && !skip_attack {
        match ctx.attack_state {
            AttackState::Start => (base * config.attack_start_rotation_speed_mult, false),
            AttackState::Mid => (base * config.attack_mid_rotation_speed_mult, false),
            AttackState::End => (base * config.attack_end_rotation_speed_mult, false),
            AttackState::None => (base, true),
        }
    } else if ctx.sprinting {
        (base * config.sprinting_rotation_speed_mult, true)
    } else {
        (base * config.running_rotation_speed_mult, true)
    }
}

/// Largest rotation allowed this frame for a remaining turn of `delta`, or
/// `None` when the speed forbids rotating.
pub fn max_rotation_step(speed: f32, relative: bool, delta: f32, dt: f32) -> Option<f32> {
    if speed <= 0.0 {
        return None;
    }
    let step = speed * dt;
    Some(if relative { step * (1.0 + delta.abs()) } else { step })
}

/// Rotate the character towards the desired heading.
pub fn update_rotation<H: ActorQuery + ActorControl + CameraQuery + ?Sized>(
    state: &mut ControllerState,
    host: &mut H,
    config: &Config,
    dt: f32,
) {
    let Some(desired) = state.desired_angle.get() else { return };
    let Some(player) = host.player() else { return };
    let Some(player_state) = host.player_state() else { return };
    let Some(actor) = host.actor(player) else { return };
    let Some(mut look) = host.free_look() else { return };
    if player_state.is_mounted() {
        return;
    }

    let delta = normalize_relative(desired - actor.yaw);
    let facing = state.facing;
    let instant = (facing.should_face_crosshair && !facing.turning_to_crosshair)
        || (state.dodge.just_dodged && !player_state.animation_driven);

    let applied = if instant {
        delta
    } else {
        let animation_driven = player_state.animation_driven && !state.is_locked();
        if animation_driven || state.dodge.dodging {
            state.desired_angle.reset();
            return;
        }

        let ctx = rotation_context(state, &player_state);
        let (speed, relative) = rotation_speed(&ctx, config, facing.turning_to_crosshair);
        let Some(limit) = max_rotation_step(speed, relative, delta, dt) else { return };
        clip_angle(delta, -limit, limit)
    };

    state.rotation_rate = if dt > 0.0 { applied / dt } else { 0.0 };
    host.set_yaw(player, normalize_relative(actor.yaw + applied));
    look.yaw = normalize_relative(look.yaw - applied);
    host.set_free_look(look);
    state.tween.accumulate(applied);

    if instant || (delta - applied).abs() < NEGLIGIBLE_ANGLE {
        debug!("reached desired heading {desired:.3}");
        state.desired_angle.reset();
    }
}

/// Point the desired heading at `target`.
///
/// Leaves the heading alone while mounted, sprinting or dodging, while the
/// crosshair has authority, and while an alternate conversation camera frames
/// the speaker. With head tracking on and the character idle, a target within
/// 45° is left to the head alone.
pub fn set_desired_angle_to_target<H: Host + ?Sized>(
    state: &mut ControllerState,
    host: &H,
    config: &Config,
    target: Option<Entity>,
) {
    let Some(player) = host.player() else { return };
    let Some(player_state) = host.player_state() else { return };
    let Some(actor) = host.actor(player) else { return };
    if player_state.is_mounted() || state.facing.should_face_crosshair {
        return;
    }

    let facing_speaker = config.dialogue_mode == DialogueMode::FaceSpeaker && state.dialogue_speaker.is_some();
    if !config.headtracking && host.alternate_conversation_camera() && facing_speaker {
        return;
    }

    let dodging = host.graph_bool(graph::DODGE).unwrap_or(false);
    if player_state.wants_to_sprint || dodging {
        return;
    }

    let Some(target_actor) = target.and_then(|t| host.actor(t)) else { return };
    let Some(heading) = heading_towards(actor.position, target_actor.position) else { return };
    let delta = normalize_relative(heading - actor.yaw);

    let idle = !state.facing.should_face_target
        && !state.has_movement_input
        && state.attack_state == AttackState::None
        && !player_state.blocking;
    if config.headtracking && (state.is_locked() || facing_speaker) && idle && delta.abs() < FRAC_PI_4 {
        return;
    }

    state.desired_angle.set(heading);
}

/// Steer the character at the hard target while the camera is not free.
pub fn update_rotation_locked_cam<H: ActorQuery + ActorControl + ?Sized>(
    state: &ControllerState,
    host: &mut H,
    config: &Config,
    dt: f32,
) {
    if state.facing.aiming {
        return;
    }
    let Some(target) = state.lock.hard_target().and_then(|t| host.actor(t)) else { return };
    let Some(player) = host.player() else { return };
    let Some(actor) = host.actor(player) else { return };
    let Some(heading) = heading_towards(actor.position, target.position) else { return };

    let yaw = interp_angle_to(actor.yaw, heading, dt, config.target_lock_yaw_adjust_speed);
    let pitch = interp_angle_to(
        actor.pitch,
        pitch_towards(actor.position, target.position),
        dt,
        config.target_lock_pitch_adjust_speed,
    );
    host.set_yaw(player, yaw);
    host.set_pitch(player, pitch);
}

/// Steer the camera's free look so that `target` stays in view.
///
/// The aim point is lowered in proportion to the distance so that both the
/// character and the target fit on screen. Yaw is measured from the point on
/// the camera-to-target ray closest to the player, which keeps the target at a
/// steady screen position as the distance changes. A target behind the camera
/// only corrects yaw. The camera pitch is flattened the more extreme it is.
pub fn look_at_target<H: ActorQuery + ActorControl + CameraQuery + ?Sized>(
    state: &mut ControllerState,
    host: &mut H,
    config: &Config,
    dt: f32,
    target: Option<Entity>,
) {
    if state.facing.aiming {
        return;
    }
    let Some(target) = target.and_then(|t| host.actor(t)) else { return };
    let (mut look, horse) = match host.mode() {
        Some(CameraMode::ThirdPerson(look)) => (look, None),
        Some(CameraMode::Mount { look, horse }) => (look, horse),
        _ => return,
    };
    let Some(player) = host.player() else { return };
    let Some(actor) = host.actor(player) else { return };
    let Some(camera_pos) = host.position() else { return };

    let target_pos = target.position;
    let player_pos = actor.position;
    let aim_point = target_pos - Vec3::Z * player_pos.distance(target_pos) * config.target_lock_pitch_offset_strength;

    let camera_to_target = aim_point - camera_pos;
    let projected_pos = camera_pos + project(player_pos - camera_pos, camera_to_target);
    let projected_to_target = (target_pos - projected_pos).truncate();
    if projected_to_target.length_squared() <= f32::EPSILON {
        return;
    }

    // Yaw
    let camera_dir = heading_to_direction(actor.yaw + look.yaw);
    let behind = projected_to_target.dot(camera_dir) < 0.0;
    let reference = if behind { -camera_dir } else { camera_dir };
    let delta = angle_between(reference, projected_to_target);
    look.yaw = interp_angle_to(look.yaw, look.yaw + delta, dt, config.target_lock_yaw_adjust_speed);

    if behind {
        host.set_free_look(look);
        return;
    }

    // Pitch
    let player_pitch = pitch_towards(player_pos, target_pos);
    let raw_camera_pitch = pitch_towards(camera_pos, aim_point);
    let camera_pitch = raw_camera_pitch * (PI - raw_camera_pitch.abs()) / PI;

    state.desired_player_pitch = player_pitch;
    host.set_pitch(player, player_pitch);
    if let Some(horse) = horse {
        host.set_pitch(horse, player_pitch);
    }

    // Keep the camera where it was while the body pitch jumps, then ease in
    look.pitch -= player_pitch - actor.pitch;
    look.pitch = interp_angle_to(look.pitch, camera_pitch - player_pitch, dt, config.target_lock_pitch_adjust_speed);
    host.set_free_look(look);
}

/// Record whether a camera blend is in progress.
pub fn update_tweening_state<H: CameraQuery + ?Sized>(state: &mut ControllerState, host: &H) {
    if let Some(tweening) = host.is_tweening() {
        state.tween.observe(tweening);
    }
}

/// Ease the swimming pitch offset towards its goal while swimming.
pub fn update_swimming_pitch<H: ActorQuery + ?Sized>(state: &mut ControllerState, host: &H, config: &Config, dt: f32) {
    if host.player_state().is_some_and(|p| p.swimming) {
        let pitch = &mut state.swimming_pitch;
        pitch.current = interp_to(pitch.current, pitch.desired, dt, config.swimming_pitch_speed);
    }
}

/// Apply a pending player pitch correction without moving the camera.
pub fn update_player_pitch<H: ActorQuery + ActorControl + CameraQuery + ?Sized>(state: &mut ControllerState, host: &mut H) {
    if !std::mem::take(&mut state.update_player_pitch) {
        return;
    }
    let Some(player) = host.player() else { return };
    let Some(actor) = host.actor(player) else { return };
    let Some(mut look) = host.free_look() else { return };

    let correction = actor.pitch - state.desired_player_pitch;
    host.set_pitch(player, state.desired_player_pitch);
    look.pitch += correction;
    host.set_free_look(look);
}
