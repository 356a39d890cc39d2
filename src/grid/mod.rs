//! Tile-derived collidable geometry: segment/edge construction and the
//! spatial indices used for broad-phase queries.

pub mod segment;
pub mod tile_tables;
pub mod world;

pub use segment::{CircularSegment, ClosestPoint, LinearSegment, Segment};
pub use world::World;
