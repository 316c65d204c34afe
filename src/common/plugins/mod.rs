pub mod directional_movement;
