//! Error types for decoding, encoding and ray casting.

use thiserror::Error;

/// Errors that can occur while decoding a tree stream.
///
/// A decode error is fatal to the asset being loaded: no partial tree is
/// ever returned alongside it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A read ran past the end of the buffer.
    #[error("truncated tree stream: needed {needed} bytes at offset {offset}, but the buffer holds {len}")]
    Truncated {
        /// Byte offset of the failed read.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Total buffer length.
        len: usize,
    },

    /// A multi-tree container held no trees at all.
    #[error("tree container is empty")]
    EmptyContainer,

    /// The declared payload kind is not one of `bool`, `coord`, `bounded`.
    #[error("unsupported tree kind: {0}")]
    UnknownKind(String),

    /// Branches are nested deeper than the decoder accepts.
    #[error("tree nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Errors that can occur while encoding a tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// A branch axis collapses to the all-zero leaf sentinel at `f32` precision.
    #[error("branch axis {0:?} is zero at f32 precision")]
    ZeroAxis([f32; 3]),
}

/// Errors raised by the ray/tree intersection engine.
///
/// These are internal-invariant violations, distinct from an ordinary miss
/// (which is `Ok(None)`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CastError {
    /// Refinement expected the far bound to lie across the plane, but it did not.
    #[error("crossing expected between t={t_min} and t={t_max}, but the half-space never flipped")]
    MissingCrossing {
        /// Near end of the refinement interval.
        t_min: f64,
        /// Far end of the refinement interval.
        t_max: f64,
    },
}

/// Result type for decoding.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Result type for ray casting.
pub type CastResult<T> = std::result::Result<T, CastError>;
