use crate::common::angle::normalize_relative;

use super::attack::AttackState;

/// Heading the character should turn toward, or unset when the camera is free.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DesiredAngle(Option<f32>);

impl DesiredAngle {
    /// Store a heading, normalized into `(-π, π]`.
    pub fn set(&mut self, angle: f32) {
        self.0 = Some(normalize_relative(angle));
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }

    pub fn get(&self) -> Option<f32> {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

/// Camera-to-camera blend bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TweenState {
    pub tweening: bool,
    /// Yaw applied to the character while the blend was running
    pub yaw_delta: f32,
}

impl TweenState {
    /// Record the latest tweening flag; the accumulator is dropped when a blend ends.
    pub fn observe(&mut self, tweening: bool) {
        let was_tweening = self.tweening;
        self.tweening = tweening;
        if was_tweening && !tweening {
            self.yaw_delta = 0.0;
        }
    }

    pub fn accumulate(&mut self, delta: f32) {
        if self.tweening {
            self.yaw_delta += delta;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DodgeState {
    pub dodging: bool,
    /// Dodge began this frame
    pub just_dodged: bool,
}

impl DodgeState {
    pub fn observe(&mut self, dodging: bool) {
        let was_dodging = self.dodging;
        self.dodging = dodging;
        self.just_dodged = !was_dodging && dodging;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SwimmingPitch {
    pub current: f32,
    pub desired: f32,
}

/// Everything the rotation speed model reads for one frame.
///
/// Built fresh each frame from the player state; never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationContext {
    pub attack_state: AttackState,
    /// Engine reports a melee swing in progress
    pub melee_attacking: bool,
    pub sprinting: bool,
    pub airborne: bool,
    /// Race is a transformation that ignores attack multipliers
    pub transformed: bool,
    /// Rotation rate of the active animation movement type (rad/s)
    pub movement_rotation_rate: Option<f32>,
}
