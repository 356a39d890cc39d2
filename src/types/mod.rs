pub mod vec2;

pub use vec2::{vec2, Vec2};
