//! Per-frame Driver
//!
//! Runs every decision system once per frame in a fixed order. Each step only
//! reads what earlier steps have settled this frame:
//!
//! 1. timers, bosses, target lock, camera tweening
//! 2. facing intent, crosshair turn, directional-movement mode, dodge edge
//! 3. crosshair visibility
//! 4. the free-camera branch (target, magnetism, speaker, rotation) or the
//!    locked-camera branch (steer at the target)
//! 5. pending player pitch correction

use bevy::prelude::*;

use crate::common::{
    host::*,
    resources::{
        buffer_depth::ControllerBufferDepth,
        config::{Config, DialogueMode},
    },
    state::{attack::AttackState, rotation::DodgeState, ControllerState},
    systems::{
        facing::*,
        headtracking::*,
        magnetism::set_desired_angle_to_magnetism_target,
        rotation::*,
        target_lock::*,
    },
};

/// Advance the controller by one frame of `dt` seconds.
pub fn update<H: Host + ?Sized>(
    state: &mut ControllerState,
    host: &mut H,
    config: &Config,
    buffer_depth: &ControllerBufferDepth,
    dt: f32,
) {
    if host.is_paused() {
        return;
    }

    state.tick(dt);
    check_bosses(state, host, config);
    update_target_lock(state, host, config);
    update_tweening_state(state, host);
    update_facing_state(state, host, config);
    if !config.face_crosshair_instantly {
        update_facing_crosshair(state, host);
    }
    update_directional_movement(state, host, config, buffer_depth);
    update_dodging_state(state, host);

    if state.facing.aiming {
        show_crosshair(state, host);
    } else if state.is_locked() {
        hide_crosshair(state, host, config);
    }

    if state.directional_movement {
        if let Some(target) = state.lock.hard_target() {
            set_desired_angle_to_target(state, host, config, Some(target));
            look_at_target(state, host, config, dt, Some(target));
            host.set_directional_movement_global(0.0);
        } else if config.melee_magnetism_enabled() {
            set_desired_angle_to_magnetism_target(state, host, config);
        }
        update_dialogue_facing(state, host, config);
        update_swimming_pitch(state, host, config, dt);
        update_rotation(state, host, config, dt);
        update_free_headtracking(state, host, config);
    } else {
        let mounted = host.player_state().is_some_and(|p| p.is_mounted());
        if mounted {
            let target = state.lock.hard_target();
            look_at_target(state, host, config, dt, target);
        } else {
            update_rotation_locked_cam(state, host, config, dt);
        }
        disable_headtracking_outside_third_person(host, config);
    }

    update_player_pitch(state, host);
}

/// Decide whether the character's heading is decoupled from the camera this
/// frame and mirror the decision to the host.
pub fn update_directional_movement<H: Host + ?Sized>(
    state: &mut ControllerState,
    host: &mut H,
    config: &Config,
    buffer_depth: &ControllerBufferDepth,
) {
    let player_state = host.player_state();
    let ai_driven = player_state.is_some_and(|p| p.ai_driven);
    let enabled = player_state.is_some_and(|p| config.directional_movement_enabled(p.weapon_drawn));

    let mode = host.mode();
    let camera_free = match mode {
        Some(CameraMode::ThirdPerson(_)) => {
            !host.alternate_first_person_active() && !host.alternate_third_person_active()
        }
        Some(CameraMode::Tween) | Some(CameraMode::Bleedout) => true,
        _ => false,
    };
    let crosshair_free = !state.facing.should_face_crosshair || state.facing.turning_to_crosshair;
    let dialogue_free = config.dialogue_mode != DialogueMode::Disable
        || host.speaker().is_none();

    let directional = enabled && !ai_driven && crosshair_free && camera_free && dialogue_free;
    if directional != state.directional_movement {
        debug!("directional movement {}", if directional { "on" } else { "off" });
    }
    state.directional_movement = directional;

    if directional {
        host.set_directional_movement_global(1.0);
    } else {
        host.set_directional_movement_global(0.0);
        if ai_driven {
            if let Some(CameraMode::ThirdPerson(mut look)) = mode {
                look.yaw = 0.0;
                host.set_free_look(look);
            }
        }
        state.desired_angle.reset();
    }

    buffer_depth.apply_override(directional, config.freecam_controller_buffer_depth);
}

/// Return the controller to a clean slate before a save is loaded.
pub fn on_pre_load_game<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    info!("resetting controller for game load");
    state.reset_controls();
    state.desired_angle.reset();
    toggle_target_lock(state, host, config, false);
    state.dodge = DodgeState::default();
    state.attack_state = AttackState::None;
    clear_targets(state, host, config);
    let bosses: Vec<Entity> = state.lock.bosses().collect();
    for boss in bosses {
        remove_boss(state, host, boss, false);
    }
    state.dialogue_speaker = None;
    state.dialogue_headtrack_timer = 0.0;
    state.magnetism_active = false;
}
