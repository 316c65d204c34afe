pub mod buffer_depth;
pub mod config;

use bevy::prelude::*;

/// Raw movement input for this frame and the vector handed back to the engine.
///
/// The host writes `raw` (and the slide-mode flag) from its input hook; the
/// remapper fills in `move_vec` and `handled`.
#[derive(Clone, Copy, Debug, Default, Resource)]
pub struct MovementInput {
    pub raw: Vec2,
    /// Engine is in its FOV slide mode; input is none of our business
    pub fov_slide_mode: bool,
    pub move_vec: Vec2,
    pub prev_move_vec: Vec2,
    /// The controller produced `move_vec`; otherwise the engine default applies
    pub handled: bool,
}

impl MovementInput {
    /// Hand a new vector to the engine, keeping the previous one.
    pub fn push(&mut self, move_vec: Vec2) {
        self.prev_move_vec = self.move_vec;
        self.move_vec = move_vec;
    }
}
