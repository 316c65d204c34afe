//! Headless stand-in for the game, used by the tests and the `sandbox` binary.

pub mod arena;
