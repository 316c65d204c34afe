use bevy::prelude::*;

use crate::common::{
    angle::*,
    host::*,
    resources::{
        config::{Config, DialogueMode},
        MovementInput,
    },
    state::ControllerState,
};

/// Remap this frame's raw movement input for directional movement.
///
/// Raw input is relative to the camera. In free movement the character walks
/// wherever it faces, so the input becomes a desired heading plus a forward
/// push of the same length. While locked on, during magnetism, or when facing
/// a speaker, the input stays a strafe, rotated into the character's frame.
///
/// Returns (and records in `input.handled`) whether the engine should use
/// `input.move_vec` instead of its own handling.
pub fn process_input<H: Host + ?Sized>(
    state: &mut ControllerState,
    host: &mut H,
    config: &Config,
    input: &mut MovementInput,
) -> bool {
    input.handled = remap(state, host, config, input);
    input.handled
}

fn remap<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config, input: &mut MovementInput) -> bool {
    if input.fov_slide_mode {
        return false;
    }
    let Some(player) = host.player() else { return false };
    let Some(player_state) = host.player_state() else { return false };
    let Some(actor) = host.actor(player) else { return false };
    let Some(look) = host.free_look() else { return false };

    if player_state.ai_driven || (player_state.animation_driven && !state.is_locked()) {
        state.desired_angle.reset();
        return false;
    }
    if state.facing.should_face_crosshair {
        if !state.facing.turning_to_crosshair {
            state.desired_angle.reset();
        }
        return false;
    }

    let raw = input.raw;
    if raw == Vec2::ZERO {
        input.push(raw);
        return true;
    }
    state.has_movement_input = true;

    let locked = state.is_locked();
    if locked && state.dodge.dodging {
        input.push(raw);
        return true;
    }

    let camera_relative = rotate_heading(raw, look.yaw);
    let facing_speaker = config.dialogue_mode == DialogueMode::FaceSpeaker && state.dialogue_speaker.is_some();
    if (locked && !player_state.wants_to_sprint) || state.magnetism_active || facing_speaker {
        input.push(camera_relative);
        return true;
    }

    let input_heading = direction_to_heading(camera_relative);
    state.desired_angle.set(actor.yaw + input_heading);

    // Character forward is +Y in its own frame
    let dot = camera_relative.normalize_or_zero().y;
    let pivot = dot < 0.0;
    if dot < config.quick_turn_dot {
        debug!("quick turn, input dot {dot:.2}");
        host.notify(graph::TURN_180);
    }

    let stop = config.stop_on_direction_change && !player_state.slow_time;
    let forward = if stop && pivot { config.pivot_input_scale } else { raw.length() };
    input.push(Vec2::new(0.0, forward));
    true
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::sandbox::arena::Arena;

    fn input(raw: Vec2) -> MovementInput {
        MovementInput { raw, ..MovementInput::default() }
    }

    fn run(arena: &mut Arena, state: &mut ControllerState, config: &Config, raw: Vec2) -> MovementInput {
        let mut movement = input(raw);
        process_input(state, arena, config, &mut movement);
        movement
    }

    #[test]
    fn test_forward_input_becomes_heading_and_push() {
        let mut arena = Arena::default();
        let mut state = ControllerState::new();

        let movement = run(&mut arena, &mut state, &Config::default(), Vec2::new(1.0, 0.0));
        assert!(movement.handled);
        assert!(state.has_movement_input);
        assert!((state.desired_angle.get().unwrap() - FRAC_PI_2).abs() < 1e-5);
        assert!((movement.move_vec - Vec2::new(0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_heading_includes_camera_offset() {
        let mut arena = Arena::default();
        arena.camera_mode = Some(CameraMode::ThirdPerson(FreeLook { yaw: 0.5, pitch: 0.0 }));
        let mut state = ControllerState::new();

        run(&mut arena, &mut state, &Config::default(), Vec2::new(0.0, 0.7));
        assert!((state.desired_angle.get().unwrap() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_reverse_input_pivots_and_cues_turn() {
        let mut arena = Arena::default();
        let mut state = ControllerState::new();

        let movement = run(&mut arena, &mut state, &Config::default(), Vec2::new(0.0, -1.0));
        assert!(arena.events.iter().any(|e| e == graph::TURN_180));
        assert!((movement.move_vec.y - 0.01).abs() < 1e-6);
        assert!((state.desired_angle.get().unwrap().abs() - PI).abs() < 1e-5);
    }

    #[test]
    fn test_sideways_pivot_without_turn_cue() {
        let mut arena = Arena::default();
        let mut state = ControllerState::new();

        // 120° away: behind, but not far enough for the 180° animation
        let raw = heading_to_direction(120_f32.to_radians());
        let movement = run(&mut arena, &mut state, &Config::default(), raw);
        assert!(arena.events.is_empty());
        assert!((movement.move_vec.y - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_no_stop_keeps_input_length() {
        let mut arena = Arena::default();
        let mut state = ControllerState::new();
        let config = Config { stop_on_direction_change: false, ..Config::default() };

        let movement = run(&mut arena, &mut state, &config, Vec2::new(0.0, -0.6));
        assert!((movement.move_vec.y - 0.6).abs() < 1e-5);

        arena.player.slow_time = true;
        let movement = run(&mut arena, &mut state, &Config::default(), Vec2::new(0.0, -0.6));
        assert!((movement.move_vec.y - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_locked_strafes_in_character_frame() {
        let mut arena = Arena::default();
        arena.camera_mode = Some(CameraMode::ThirdPerson(FreeLook { yaw: FRAC_PI_2, pitch: 0.0 }));
        let target = arena.spawn_hostile(Vec3::X * 300.0);
        let mut state = ControllerState::new();
        state.lock.lock(target);

        let movement = run(&mut arena, &mut state, &Config::default(), Vec2::new(0.0, 1.0));
        assert!(movement.handled);
        assert!((movement.move_vec - Vec2::new(1.0, 0.0)).length() < 1e-5);
        assert!(!state.desired_angle.is_set());

        arena.player.wants_to_sprint = true;
        arena.camera_mode = Some(CameraMode::ThirdPerson(FreeLook::default()));
        let movement = run(&mut arena, &mut state, &Config::default(), Vec2::new(0.0, 1.0));
        assert!((movement.move_vec - Vec2::new(0.0, 1.0)).length() < 1e-5);
        assert!(state.desired_angle.is_set());
    }

    #[test]
    fn test_locked_dodge_passes_raw_input() {
        let mut arena = Arena::default();
        arena.camera_mode = Some(CameraMode::ThirdPerson(FreeLook { yaw: 1.0, pitch: 0.0 }));
        let target = arena.spawn_hostile(Vec3::Y * 300.0);
        let mut state = ControllerState::new();
        state.lock.lock(target);
        state.dodge.dodging = true;

        let movement = run(&mut arena, &mut state, &Config::default(), Vec2::new(0.3, 0.4));
        assert_eq!(movement.move_vec, Vec2::new(0.3, 0.4));
    }

    #[test]
    fn test_zero_input_is_handled_unchanged() {
        let mut arena = Arena::default();
        let mut state = ControllerState::new();
        let movement = run(&mut arena, &mut state, &Config::default(), Vec2::ZERO);
        assert!(movement.handled);
        assert_eq!(movement.move_vec, Vec2::ZERO);
        assert!(!state.desired_angle.is_set());
        assert!(!state.has_movement_input);
    }

    #[test]
    fn test_not_handled_cases() {
        let config = Config::default();

        let mut arena = Arena::default();
        let mut state = ControllerState::new();
        let mut movement = input(Vec2::Y);
        movement.fov_slide_mode = true;
        assert!(!process_input(&mut state, &mut arena, &config, &mut movement));

        arena.player.ai_driven = true;
        state.desired_angle.set(1.0);
        assert!(!run(&mut arena, &mut state, &config, Vec2::Y).handled);
        assert!(!state.desired_angle.is_set());
        assert!(!state.has_movement_input);

        let mut arena = Arena::default();
        arena.camera_mode = None;
        assert!(!run(&mut arena, &mut state, &config, Vec2::Y).handled);
    }

    #[test]
    fn test_tween_camera_still_remaps() {
        let mut arena = Arena::default();
        arena.camera_mode = Some(CameraMode::Tween);
        let mut state = ControllerState::new();

        let movement = run(&mut arena, &mut state, &Config::default(), Vec2::new(1.0, 0.0));
        assert!(movement.handled);
        assert!((state.desired_angle.get().unwrap() - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_crosshair_authority_keeps_turn_in_progress() {
        let mut arena = Arena::default();
        let mut state = ControllerState::new();
        state.facing.should_face_crosshair = true;
        state.facing.turning_to_crosshair = true;
        state.desired_angle.set(0.8);

        assert!(!run(&mut arena, &mut state, &Config::default(), Vec2::Y).handled);
        assert_eq!(state.desired_angle.get(), Some(0.8));

        state.facing.turning_to_crosshair = false;
        run(&mut arena, &mut state, &Config::default(), Vec2::Y);
        assert!(!state.desired_angle.is_set());
    }
}
