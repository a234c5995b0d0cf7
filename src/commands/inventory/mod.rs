pub mod item;
pub mod movement;
