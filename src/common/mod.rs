pub mod angle;
pub mod host;
pub mod plugins;
pub mod resources;
pub mod state;
pub mod systems;
