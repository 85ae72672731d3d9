//! Space trees: binary partitions of 3D space by oriented planes.
//!
//! Each branch splits space with a [`Split`](crate::Split); each leaf holds a
//! classification value. Trees are immutable: transforms return new trees
//! that share every untouched leaf with the original.
//!
//! # Example
//!
//! ```
//! use nalgebra::{Point3, Vector3};
//! use space_tree::{SpaceTree, Split};
//!
//! // Solid below z = 0.5.
//! let tree = SpaceTree::branch(
//!     Split::new(Vector3::z(), 0.5),
//!     SpaceTree::leaf(true),
//!     SpaceTree::leaf(false),
//! );
//! assert!(*tree.predict(&Point3::new(0.0, 0.0, 0.0)));
//!
//! // Move the shape up by one unit.
//! let moved = tree.translate(&Vector3::new(0.0, 0.0, 1.0));
//! assert!(*moved.predict(&Point3::new(0.0, 0.0, 1.0)));
//! ```
//!
//! # Architecture
//!
//! - [`SpaceNode`]: leaf or branch, children shared through `Arc`
//! - [`SpaceTree`]: handle to a root node with classification and transforms
//! - [`BoundedSolidTree`]: boolean tree clipped to an axis-aligned box
//! - [`NormalField`]: ensemble of normal-vector trees

mod bounded;
mod ensemble;
mod node;
#[allow(clippy::module_inception)]
mod tree;

pub use bounded::BoundedSolidTree;
pub use ensemble::NormalField;
pub use node::SpaceNode;
pub use tree::SpaceTree;
