//! Space trees: recursive half-space partitions of 3D space.
//!
//! A space tree stores a solid shape (or a field of surface normals) as a
//! binary tree of oriented cutting planes. This crate decodes the compact
//! serialized form of such trees and casts rays against them exactly,
//! including the degenerate configurations that show up with tight
//! bounding boxes.
//!
//! # Architecture
//!
//! - [`math`], [`Ray`], [`Camera`]: geometry kernel and primary-ray generation
//! - [`codec`]: little-endian `f32` tree format, single trees and sequences
//! - [`tree`]: [`SpaceTree`], [`BoundedSolidTree`], [`NormalField`] and the
//!   persistent `scale`/`translate` transforms
//! - [`raycast`]: first classification change along a ray
//! - [`shading`]: brightness from a hit and its normal
//! - [`Normalization`]: maps a bounded model into the `[-1, 1]` cube

mod camera;
pub mod codec;
mod error;
pub mod math;
mod normalize;
mod ray;
pub mod raycast;
pub mod shading;
mod split;
pub mod tree;

pub use camera::{Camera, PixelRays};
pub use codec::{DecodedTree, PayloadKind};
pub use error::{CastError, DecodeError, EncodeError};
pub use math::{VectorExt, rotation};
pub use normalize::Normalization;
pub use ray::{ChangePoint, Ray};
pub use raycast::{CastOutcome, Occupancy, RayChanges};
pub use split::{Side, Split};
pub use tree::{BoundedSolidTree, NormalField, SpaceNode, SpaceTree};
