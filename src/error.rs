//! Error types for content loading and world bookkeeping.
//!
//! Geometry queries never fail: "no intersection" is an empty result, not an error.

use crate::sim::state::{BlockId, BodyId};

/// Errors that can occur when loading content or addressing the world.
#[derive(Debug, thiserror::Error)]
pub enum PlanetariaError {
    /// Failed to read or write a file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize JSON content.
    #[error("failed to parse content: {0}")]
    Parse(#[from] serde_json::Error),

    /// A compact arc record could not be turned back into an arc.
    #[error("invalid arc #{index}: {reason}")]
    InvalidArc { index: usize, reason: &'static str },

    /// A level block could not be placed in the world.
    #[error("invalid block #{index}: {reason}")]
    InvalidBlock { index: usize, reason: &'static str },

    /// The level file was written by an incompatible version.
    #[error("unsupported level version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// A block was defined without any arcs.
    #[error("shape has no arcs")]
    EmptyShape,

    /// The block handle does not refer to a live block.
    #[error("unknown block {0:?}")]
    UnknownBlock(BlockId),

    /// The body handle does not refer to a live body.
    #[error("unknown body {0:?}")]
    UnknownBody(BodyId),
}
