pub mod common;
pub mod sandbox;

pub use common::plugins::directional_movement::DirectionalMovementPlugin;
