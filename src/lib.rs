//! A deterministic, frame-stepped physics core for a 2D platformer.
//!
//! Given a raw map byte buffer and a stream of per-frame input codes, this
//! crate reproduces the reference engine's exact trajectory: same tile
//! geometry, same entity state machines, same collision pipeline, same
//! floating-point operation order. There is no rendering, no input device
//! handling, and no replay file format here — just [`Simulator::load`] and
//! [`Simulator::tick`].

pub mod constants;
pub mod entities;
pub mod error;
pub mod grid;
pub mod math;
pub mod ninja;
pub mod sim;
pub mod types;

pub use error::{Result, SimError};
pub use sim::{decode_input, PositionSample, Simulator, VelocitySample};
pub use types::Vec2;
