//! Binary tree format.
//!
//! A tree stream is a sequence of little-endian `f32` words consumed left to
//! right by recursive descent:
//!
//! ```text
//! node     := axis:vec3  (axis == 0 → payload | threshold:f32 left:node right:node)
//! payload  := bool: f32 (nonzero = true) | coord: vec3
//! bounded  := min:vec3 max:vec3 node<bool>
//! sequence := node node ...   (until the buffer is exhausted)
//! ```
//!
//! The all-zero axis is the leaf sentinel, so a branch can never carry a
//! zero axis. Bounded streams carry their box before the embedded boolean
//! tree; the decoder re-wraps the tree with its six bounding branches.

mod reader;
mod writer;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use nalgebra::Vector3;

use crate::error::DecodeResult;
use crate::{BoundedSolidTree, DecodeError, EncodeError, SpaceNode, SpaceTree, Split};

pub use reader::{FloatReader, WORD_SIZE};
pub use writer::FloatWriter;

/// Deepest branch nesting the decoder accepts.
///
/// Streams come from untrusted buffers, and decoding recurses once per
/// level.
pub const MAX_TREE_DEPTH: usize = 2048;

/// The declared payload kind of a tree stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Solid/empty leaves.
    Bool,
    /// Vector leaves, used by normal fields.
    Coord,
    /// A bounding box followed by a boolean tree.
    Bounded,
}

impl PayloadKind {
    /// The kind's name in the stream vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadKind::Bool => "bool",
            PayloadKind::Coord => "coord",
            PayloadKind::Bounded => "bounded",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(PayloadKind::Bool),
            "coord" => Ok(PayloadKind::Coord),
            "bounded" => Ok(PayloadKind::Bounded),
            other => Err(DecodeError::UnknownKind(other.to_string())),
        }
    }
}

/// A leaf value that can be stored in a tree stream.
pub trait Payload: Sized {
    /// Reads one leaf value.
    fn read(reader: &mut FloatReader<'_>) -> DecodeResult<Self>;

    /// Writes one leaf value.
    fn write(&self, writer: &mut FloatWriter);
}

impl Payload for bool {
    fn read(reader: &mut FloatReader<'_>) -> DecodeResult<Self> {
        Ok(reader.next()? != 0.0)
    }

    fn write(&self, writer: &mut FloatWriter) {
        writer.push(if *self { 1.0 } else { 0.0 });
    }
}

impl Payload for Vector3<f64> {
    fn read(reader: &mut FloatReader<'_>) -> DecodeResult<Self> {
        reader.next_vector()
    }

    fn write(&self, writer: &mut FloatWriter) {
        writer.push_vector(self);
    }
}

/// A tree decoded from a stream whose kind is only known at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedTree {
    Solid(SpaceTree<bool>),
    Normals(SpaceTree<Vector3<f64>>),
    Bounded(BoundedSolidTree),
}

impl DecodedTree {
    /// The payload kind this tree was decoded as.
    pub fn kind(&self) -> PayloadKind {
        match self {
            DecodedTree::Solid(_) => PayloadKind::Bool,
            DecodedTree::Normals(_) => PayloadKind::Coord,
            DecodedTree::Bounded(_) => PayloadKind::Bounded,
        }
    }

    /// Leaf count of the decoded tree, excluding bounding branches.
    pub fn num_leaves(&self) -> usize {
        match self {
            DecodedTree::Solid(tree) => tree.num_leaves(),
            DecodedTree::Normals(tree) => tree.num_leaves(),
            DecodedTree::Bounded(bounded) => bounded.inner().num_leaves(),
        }
    }

    /// Depth of the decoded tree, excluding bounding branches.
    pub fn depth(&self) -> usize {
        match self {
            DecodedTree::Solid(tree) => tree.depth(),
            DecodedTree::Normals(tree) => tree.depth(),
            DecodedTree::Bounded(bounded) => bounded.inner().depth(),
        }
    }

    /// Returns the bounded tree, if that is what was decoded.
    pub fn into_bounded(self) -> Option<BoundedSolidTree> {
        match self {
            DecodedTree::Bounded(bounded) => Some(bounded),
            _ => None,
        }
    }
}

/// Decodes a single tree of the given kind.
pub fn decode(bytes: &[u8], kind: PayloadKind) -> DecodeResult<DecodedTree> {
    let decoded = match kind {
        PayloadKind::Bool => DecodedTree::Solid(decode_tree(bytes)?),
        PayloadKind::Coord => DecodedTree::Normals(decode_tree(bytes)?),
        PayloadKind::Bounded => DecodedTree::Bounded(decode_bounded(bytes)?),
    };
    log::debug!(
        "decoded {} tree from {} bytes: {} leaves, depth {}",
        kind,
        bytes.len(),
        decoded.num_leaves(),
        decoded.depth()
    );
    Ok(decoded)
}

/// Decodes a single plain tree.
pub fn decode_tree<T: Payload>(bytes: &[u8]) -> DecodeResult<SpaceTree<T>> {
    let mut reader = FloatReader::new(bytes);
    let tree = read_tree(&mut reader)?;
    warn_trailing(&reader);
    Ok(tree)
}

/// Decodes a bounded solid tree and wraps it with its bounding branches.
pub fn decode_bounded(bytes: &[u8]) -> DecodeResult<BoundedSolidTree> {
    let mut reader = FloatReader::new(bytes);
    let min = reader.next_point()?;
    let max = reader.next_point()?;
    let inner = read_tree(&mut reader)?;
    warn_trailing(&reader);
    Ok(BoundedSolidTree::new(min, max, inner))
}

/// Decodes trees back to back until the buffer is exhausted.
///
/// Fails with [`DecodeError::EmptyContainer`] if the buffer is empty.
pub fn decode_many<T: Payload>(bytes: &[u8]) -> DecodeResult<Vec<SpaceTree<T>>> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyContainer);
    }
    let mut reader = FloatReader::new(bytes);
    let mut trees = Vec::new();
    while !reader.is_done() {
        trees.push(read_tree(&mut reader)?);
    }
    log::debug!("decoded {} trees from {} bytes", trees.len(), bytes.len());
    Ok(trees)
}

fn read_tree<T: Payload>(reader: &mut FloatReader<'_>) -> DecodeResult<SpaceTree<T>> {
    read_node(reader, 0).map(SpaceTree::from)
}

fn read_node<T: Payload>(
    reader: &mut FloatReader<'_>,
    depth: usize,
) -> DecodeResult<Arc<SpaceNode<T>>> {
    if depth >= MAX_TREE_DEPTH {
        return Err(DecodeError::TooDeep(MAX_TREE_DEPTH));
    }
    let axis = reader.next_vector()?;
    if axis == Vector3::zeros() {
        return Ok(Arc::new(SpaceNode::Leaf(T::read(reader)?)));
    }
    let threshold = reader.next()?;
    let left = read_node(reader, depth + 1)?;
    let right = read_node(reader, depth + 1)?;
    Ok(Arc::new(SpaceNode::Branch {
        split: Split::new(axis, threshold),
        left,
        right,
    }))
}

fn warn_trailing(reader: &FloatReader<'_>) {
    if !reader.is_done() {
        log::warn!(
            "ignoring {} trailing bytes after tree at offset {}",
            reader.remaining(),
            reader.offset()
        );
    }
}

/// Encodes a plain tree.
pub fn encode_tree<T: Payload>(tree: &SpaceTree<T>) -> Result<Vec<u8>, EncodeError> {
    let mut writer = FloatWriter::new();
    write_node(tree.root(), &mut writer)?;
    Ok(writer.into_bytes())
}

/// Encodes a bounded tree as its box followed by the unwrapped inner tree.
pub fn encode_bounded(bounded: &BoundedSolidTree) -> Result<Vec<u8>, EncodeError> {
    let mut writer = FloatWriter::new();
    writer.push_point(bounded.min());
    writer.push_point(bounded.max());
    write_node(bounded.inner().root(), &mut writer)?;
    Ok(writer.into_bytes())
}

/// Encodes trees back to back, readable with [`decode_many`].
pub fn encode_many<T: Payload>(trees: &[SpaceTree<T>]) -> Result<Vec<u8>, EncodeError> {
    let mut writer = FloatWriter::new();
    for tree in trees {
        write_node(tree.root(), &mut writer)?;
    }
    Ok(writer.into_bytes())
}

fn write_node<T: Payload>(node: &SpaceNode<T>, writer: &mut FloatWriter) -> Result<(), EncodeError> {
    match node {
        SpaceNode::Leaf(value) => {
            writer.push_vector(&Vector3::zeros());
            value.write(writer);
        }
        SpaceNode::Branch { split, left, right } => {
            let axis = split.axis();
            let narrowed = [axis.x as f32, axis.y as f32, axis.z as f32];
            if narrowed == [0.0; 3] {
                return Err(EncodeError::ZeroAxis(narrowed));
            }
            writer.push_vector(axis);
            writer.push(split.threshold());
            write_node(left, writer)?;
            write_node(right, writer)?;
        }
    }
    Ok(())
}
