//! Little-endian `f32` stream writer.

use nalgebra::{Point3, Vector3};

/// Appends the tree format's `f32` words to a byte buffer.
#[derive(Debug, Clone, Default)]
pub struct FloatWriter {
    bytes: Vec<u8>,
}

impl FloatWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one word, narrowing to `f32`.
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.bytes.extend_from_slice(&(value as f32).to_le_bytes());
    }

    /// Appends three words.
    pub fn push_vector(&mut self, v: &Vector3<f64>) {
        self.push(v.x);
        self.push(v.y);
        self.push(v.z);
    }

    /// Appends three words.
    #[inline]
    pub fn push_point(&mut self, p: &Point3<f64>) {
        self.push_vector(&p.coords);
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
