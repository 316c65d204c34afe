pub mod attack;
pub mod facing;
pub mod rotation;
pub mod target_lock;

use bevy::prelude::*;

use self::{
    attack::AttackState,
    facing::FacingState,
    rotation::{DesiredAngle, DodgeState, SwimmingPitch, TweenState},
    target_lock::TargetLockState,
};

/// All controller state that outlives a single frame.
///
/// Threaded explicitly through every system; there are no hidden statics.
/// Only the buffer depth override lives elsewhere (see
/// `resources::buffer_depth`) because the input thread touches it.
#[derive(Clone, Debug, Default, Resource)]
pub struct ControllerState {
    pub lock: TargetLockState,
    pub facing: FacingState,
    pub desired_angle: DesiredAngle,
    pub attack_state: AttackState,
    pub dodge: DodgeState,
    pub tween: TweenState,
    pub swimming_pitch: SwimmingPitch,
    /// Character heading is decoupled from the camera this frame
    pub directional_movement: bool,
    /// Movement input arrived since the last `reset_controls`
    pub has_movement_input: bool,
    pub magnetism_active: bool,
    pub dialogue_speaker: Option<Entity>,
    pub dialogue_headtrack_timer: f32,
    pub crosshair_hidden: bool,
    /// Angular rate implied by the last applied rotation (rad/s)
    pub rotation_rate: f32,
    pub desired_player_pitch: f32,
    pub update_player_pitch: bool,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Set by the animation-event collaborator.
    pub fn set_attack_state(&mut self, state: AttackState) {
        self.attack_state = state;
    }

    /// Count down every frame timer.
    pub fn tick(&mut self, dt: f32) {
        if self.dialogue_headtrack_timer > 0.0 {
            self.dialogue_headtrack_timer -= dt;
        }
        self.lock.tick(dt);
        self.facing.tick(dt);
    }

    /// Forget the movement input seen this frame.
    pub fn reset_controls(&mut self) {
        self.has_movement_input = false;
    }

    /// Hand the last rotation rate to the animation system and clear it.
    pub fn take_rotation_rate(&mut self) -> f32 {
        std::mem::take(&mut self.rotation_rate)
    }

    /// Ask for the player pitch to be re-synced on the next pitch update.
    pub fn request_player_pitch_update(&mut self) {
        self.update_player_pitch = true;
    }
}
