//! Error types for simulator load and setup.
//!
//! A correctly loaded [`crate::sim::Simulator`] never produces a runtime
//! error: every per-tick lookup is into a pre-sized, clamped grid, and every
//! collision loop is iteration-bounded. All failure is therefore concentrated
//! at `load` time.

use std::fmt;

/// Error type for map loading and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Map byte buffer is shorter than the fixed header all loaders assume.
    MalformedMap {
        reason: String,
    },

    /// A tile byte outside `0..=37` was found in the tile data region.
    UnknownTileId {
        cell_x: usize,
        cell_y: usize,
        tile_id: u8,
    },

    /// The entity table ends in the middle of a 5-byte record, or a
    /// trailing switch-coordinate lookup runs past the end of the buffer.
    TruncatedEntityRecord {
        offset: usize,
    },

    /// Debug-only: a segment accumulator produced an orientation the
    /// geometry model has no representation for. Never observed from a
    /// well-formed map; kept as a fatal assertion rather than a silent
    /// skip so a broken accumulator doesn't go unnoticed.
    InvariantViolation {
        detail: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedMap { reason } => write!(f, "malformed map: {}", reason),
            Self::UnknownTileId { cell_x, cell_y, tile_id } => {
                write!(
                    f,
                    "unknown tile id {} at cell ({}, {})",
                    tile_id, cell_x, cell_y
                )
            }
            Self::TruncatedEntityRecord { offset } => {
                write!(f, "entity record truncated at byte offset {}", offset)
            }
            Self::InvariantViolation { detail } => {
                write!(f, "invariant violation: {}", detail)
            }
        }
    }
}

impl std::error::Error for SimError {}

impl From<SimError> for String {
    fn from(e: SimError) -> Self {
        e.to_string()
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_map_display() {
        let err = SimError::MalformedMap {
            reason: "buffer shorter than 1233 bytes".to_string(),
        };
        assert!(err.to_string().contains("1233 bytes"));
    }

    #[test]
    fn unknown_tile_id_display() {
        let err = SimError::UnknownTileId {
            cell_x: 4,
            cell_y: 9,
            tile_id: 200,
        };
        let s = err.to_string();
        assert!(s.contains("200"));
        assert!(s.contains("(4, 9)"));
    }

    #[test]
    fn truncated_entity_record_display() {
        let err = SimError::TruncatedEntityRecord { offset: 1412 };
        assert!(err.to_string().contains("1412"));
    }

    #[test]
    fn error_to_string_conversion() {
        let err = SimError::InvariantViolation {
            detail: "segment sign out of range".to_string(),
        };
        let s: String = err.into();
        assert!(s.contains("segment sign out of range"));
    }
}
