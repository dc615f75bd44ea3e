// Pure simulation rules shared by the drivers and the board.

pub mod collisions;
pub mod movement;
pub mod spawning;
