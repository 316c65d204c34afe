//! Controller Configuration
//!
//! Flat snapshot of every threshold and multiplier the controller reads.
//! Loading it from disk belongs to the host; every field has a default so a
//! partial document deserializes cleanly. The host may replace the resource
//! at any time and the next frame picks the new values up.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// What happens to the character during a conversation
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum DialogueMode {
    /// Directional movement is suspended while a speaker is active
    Disable,
    /// Keep free movement, ignore the speaker
    Normal,
    /// Turn to face the speaker
    #[default]
    FaceSpeaker,
}

/// How the head follows the camera's free-look offset
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum CameraHeadtrackingMode {
    /// Stop tracking once the camera swings too far behind
    Disable,
    #[default]
    Normal,
    /// Look back at the camera when it is in front of the character
    FaceCamera,
}

/// Aim model for ranged attacks while a target is locked
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum AimType {
    /// Shots go to the locked target; the crosshair keeps no authority
    #[default]
    Target,
    /// Aim with the crosshair even while locked
    Free,
}

/// Form ids used to recognize boss encounters
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct BossRecognition {
    pub races: HashSet<u32>,
    pub npcs: HashSet<u32>,
    pub location_ref_types: HashSet<u32>,
    pub npc_blacklist: HashSet<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Resource, Serialize)]
#[serde(default)]
pub struct Config {
    // Directional movement
    pub directional_movement_sheathed: bool,
    pub directional_movement_drawn: bool,
    pub dialogue_mode: DialogueMode,
    pub stop_on_direction_change: bool,
    /// Facing vs input dot product below which the 180° turn cue fires
    pub quick_turn_dot: f32,
    /// Forward input kept while pivoting with `stop_on_direction_change`
    pub pivot_input_scale: f32,
    pub freecam_controller_buffer_depth: f32,

    // Headtracking
    pub headtracking: bool,
    pub dialogue_headtracking_duration: f32,
    pub camera_headtracking_mode: CameraHeadtrackingMode,
    pub camera_headtracking_strength: f32,

    // Facing the crosshair
    pub face_crosshair_instantly: bool,
    pub face_crosshair_during_auto_move: bool,
    pub face_crosshair_while_attacking: bool,
    pub face_crosshair_while_shouting: bool,
    pub face_crosshair_while_blocking: bool,
    /// Seconds the crosshair keeps authority after the triggering action ends
    pub face_crosshair_duration: f32,
    pub face_crosshair_rotation_speed_multiplier: f32,

    // Rotation speed
    pub running_rotation_speed_mult: f32,
    pub sprinting_rotation_speed_mult: f32,
    pub air_rotation_speed_mult: f32,
    pub attack_start_rotation_speed_mult: f32,
    pub attack_mid_rotation_speed_mult: f32,
    pub attack_end_rotation_speed_mult: f32,
    pub disable_attack_rotation_multipliers_for_transformations: bool,
    pub swimming_pitch_speed: f32,

    // Melee magnetism
    /// Half-angle of the magnetism cone in degrees; zero disables magnetism
    pub melee_magnetism_angle: f32,
    pub melee_magnetism_range: f32,

    // Target lock
    pub target_lock_distance: f32,
    pub target_lock_distance_multiplier_small: f32,
    pub target_lock_distance_multiplier_large: f32,
    pub target_lock_distance_multiplier_extra_large: f32,
    /// Extra distance factor (> 1) applied to an already locked target
    pub target_lock_distance_hysteresis: f32,
    pub target_lock_test_los: bool,
    /// Seconds a locked target may stay out of sight
    pub target_lock_los_grace: f32,
    pub target_lock_hostile_actors_only: bool,
    pub target_lock_hide_crosshair: bool,
    pub target_lock_yaw_adjust_speed: f32,
    pub target_lock_pitch_adjust_speed: f32,
    pub target_lock_pitch_offset_strength: f32,
    pub target_lock_arrow_aim_type: AimType,
    pub target_lock_missile_aim_type: AimType,
    pub target_switch_cooldown: f32,

    // Widgets
    pub show_soft_target_bar: bool,
    pub show_boss_bar: bool,
    pub boss_recognition: BossRecognition,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directional_movement_sheathed: true,
            directional_movement_drawn: true,
            dialogue_mode: DialogueMode::FaceSpeaker,
            stop_on_direction_change: true,
            quick_turn_dot: -0.8,
            pivot_input_scale: 0.01,
            freecam_controller_buffer_depth: 0.02,

            headtracking: true,
            dialogue_headtracking_duration: 3.0,
            camera_headtracking_mode: CameraHeadtrackingMode::Normal,
            camera_headtracking_strength: 0.75,

            face_crosshair_instantly: false,
            face_crosshair_during_auto_move: true,
            face_crosshair_while_attacking: false,
            face_crosshair_while_shouting: true,
            face_crosshair_while_blocking: true,
            face_crosshair_duration: 0.4,
            face_crosshair_rotation_speed_multiplier: 2.0,

            running_rotation_speed_mult: 1.5,
            sprinting_rotation_speed_mult: 2.0,
            air_rotation_speed_mult: 0.5,
            attack_start_rotation_speed_mult: 5.0,
            attack_mid_rotation_speed_mult: 1.0,
            attack_end_rotation_speed_mult: 0.0,
            disable_attack_rotation_multipliers_for_transformations: true,
            swimming_pitch_speed: 3.0,

            melee_magnetism_angle: 60.0,
            melee_magnetism_range: 250.0,

            target_lock_distance: 2000.0,
            target_lock_distance_multiplier_small: 1.0,
            target_lock_distance_multiplier_large: 2.0,
            target_lock_distance_multiplier_extra_large: 4.0,
            target_lock_distance_hysteresis: 1.05,
            target_lock_test_los: true,
            target_lock_los_grace: 1.0,
            target_lock_hostile_actors_only: true,
            target_lock_hide_crosshair: true,
            target_lock_yaw_adjust_speed: 8.0,
            target_lock_pitch_adjust_speed: 2.0,
            target_lock_pitch_offset_strength: 0.25,
            target_lock_arrow_aim_type: AimType::Target,
            target_lock_missile_aim_type: AimType::Target,
            target_switch_cooldown: 0.25,

            show_soft_target_bar: true,
            show_boss_bar: true,
            boss_recognition: BossRecognition::default(),
        }
    }
}

impl Config {
    /// Directional movement option for the current weapon state.
    pub fn directional_movement_enabled(&self, weapon_drawn: bool) -> bool {
        if weapon_drawn { self.directional_movement_drawn } else { self.directional_movement_sheathed }
    }

    pub fn melee_magnetism_enabled(&self) -> bool {
        self.melee_magnetism_angle > 0.0
    }
}
