use super::attack::AttackAnimation;

/// Facing intent for the current frame plus the hold timer that carries it over.
///
/// The flags are re-derived every frame by `systems::facing::update_facing_state`;
/// only `hold_timer` and `last_attack` survive between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FacingState {
    pub should_face_crosshair: bool,
    pub should_face_target: bool,
    pub aiming: bool,
    /// Rotating toward the camera heading because of the crosshair flag
    pub turning_to_crosshair: bool,
    /// Grace period during which the crosshair keeps authority
    pub hold_timer: f32,
    /// Last attack animation seen that was not a bow re-attach
    pub last_attack: AttackAnimation,
}

impl FacingState {
    /// Re-arm the hold timer to the configured duration.
    pub fn arm(&mut self, duration: f32) {
        self.hold_timer = duration;
    }

    pub fn is_holding(&self) -> bool {
        self.hold_timer > 0.0
    }

    pub fn tick(&mut self, dt: f32) {
        if self.hold_timer > 0.0 {
            self.hold_timer -= dt;
        }
    }

    pub fn cancel_hold(&mut self) {
        self.hold_timer = 0.0;
    }
}
