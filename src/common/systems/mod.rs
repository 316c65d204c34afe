pub mod camera;
pub mod controller;
pub mod facing;
pub mod headtracking;
pub mod input;
pub mod magnetism;
pub mod rotation;
pub mod target_lock;
pub mod targeting;
pub mod validation;
