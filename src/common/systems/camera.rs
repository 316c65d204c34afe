use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;

use crate::common::{
    angle::*,
    host::*,
    resources::config::{CameraHeadtrackingMode, Config},
};

/// Distance along the look direction at which the head-tracking point is placed
const HEADTRACK_DISTANCE: f32 = 500.0;

/// World yaw and pitch of the active camera, derived from the player's own
/// orientation and the camera mode.
///
/// Modes without their own orientation fall back to the player's.
pub fn camera_rotation(mode: Option<CameraMode>, player: &ActorSnapshot) -> (f32, f32) {
    match mode {
        Some(CameraMode::FirstPerson { pitch }) => (player.yaw, pitch),
        Some(CameraMode::ThirdPerson(look)) | Some(CameraMode::Mount { look, .. }) => {
            (player.yaw + look.yaw, player.pitch + look.pitch)
        }
        _ => (player.yaw, player.pitch),
    }
}

/// Point the player's head along the camera's free-look offset.
///
/// Only third-person and mount cameras carry an offset. In `Disable` mode
/// the head stops following once the camera swings more than 120° behind;
/// in `FaceCamera` mode a camera in front of the character makes the head
/// look back at it.
pub fn update_camera_headtracking<H: ActorQuery + CameraQuery + AnimationSink + ?Sized>(host: &mut H, config: &Config) {
    let Some(look) = host.mode().and_then(|mode| mode.free_look()) else { return };
    let Some(player) = host.player() else { return };
    let Some(player_actor) = host.actor(player) else { return };
    let Some(player_state) = host.player_state() else { return };

    let yaw_offset = normalize_relative(look.yaw);
    let camera_in_front = yaw_offset.abs() >= FRAC_PI_2;

    let mut reverse = false;
    let mut strength = 1.0;
    let mut pitch_strength = 1.0;
    let mut pitch_offset = 0.0;
    match config.camera_headtracking_mode {
        CameraHeadtrackingMode::Disable if yaw_offset.abs() >= 2.0 * PI / 3.0 => return,
        CameraHeadtrackingMode::FaceCamera if camera_in_front => {
            reverse = true;
            if player_state.is_mounted() {
                pitch_offset = 0.2;
                pitch_strength = 0.5;
            }
        }
        _ => strength = config.camera_headtracking_strength,
    }

    let direction = if reverse {
        // Back along the camera ray, towards the lens
        let camera_yaw = player_actor.yaw + look.yaw;
        let camera_pitch = normalize_relative(player_actor.pitch + look.pitch);
        look_direction(camera_yaw + PI, -camera_pitch * pitch_strength + pitch_offset)
    } else {
        let heading = normalize_relative(player_actor.yaw + yaw_offset * strength);
        let pitch = normalize_relative(player_actor.pitch + look.pitch) * strength;
        look_direction(heading, pitch)
    };

    host.set_headtrack_point(player_state.look_origin + direction * HEADTRACK_DISTANCE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::arena::Arena;

    #[test]
    fn test_third_person_rotation_adds_free_look() {
        let player = ActorSnapshot { yaw: 1.0, pitch: 0.1, ..default() };
        let mode = CameraMode::ThirdPerson(FreeLook { yaw: 0.5, pitch: 0.2 });
        let (yaw, pitch) = camera_rotation(Some(mode), &player);
        assert!((yaw - 1.5).abs() < 1e-6);
        assert!((pitch - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_first_person_uses_camera_pitch() {
        let player = ActorSnapshot { yaw: 1.0, pitch: 0.1, ..default() };
        let (yaw, pitch) = camera_rotation(Some(CameraMode::FirstPerson { pitch: -0.4 }), &player);
        assert_eq!((yaw, pitch), (1.0, -0.4));
        assert_eq!(camera_rotation(None, &player), (1.0, 0.1));
    }

    #[test]
    fn test_headtracking_follows_camera_offset() {
        let mut arena = Arena::default();
        arena.camera_mode = Some(CameraMode::ThirdPerson(FreeLook { yaw: 0.8, pitch: 0.0 }));
        update_camera_headtracking(&mut arena, &Config::default());

        let point = arena.headtrack_point.expect("point written");
        let heading = direction_to_heading((point - arena.player.look_origin).truncate());
        assert!((heading - 0.8 * 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_disable_mode_stops_behind() {
        let mut arena = Arena::default();
        arena.camera_mode = Some(CameraMode::ThirdPerson(FreeLook { yaw: 2.5, pitch: 0.0 }));
        let config = Config { camera_headtracking_mode: CameraHeadtrackingMode::Disable, ..default() };
        update_camera_headtracking(&mut arena, &config);
        assert_eq!(arena.headtrack_point, None);
    }

    #[test]
    fn test_face_camera_looks_back() {
        let mut arena = Arena::default();
        arena.camera_mode = Some(CameraMode::ThirdPerson(FreeLook { yaw: PI, pitch: 0.0 }));
        let config = Config { camera_headtracking_mode: CameraHeadtrackingMode::FaceCamera, ..default() };
        update_camera_headtracking(&mut arena, &config);

        // Camera sits in front looking back at the character; the head looks at it
        let point = arena.headtrack_point.expect("point written");
        let offset = point - arena.player.look_origin;
        assert!(offset.y > 0.0);
    }
}
