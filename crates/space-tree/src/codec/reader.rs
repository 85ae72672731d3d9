//! Little-endian `f32` stream reader.

use nalgebra::{Point3, Vector3};

use crate::DecodeError;
use crate::error::DecodeResult;

/// Size of one stream word in bytes.
pub const WORD_SIZE: usize = 4;

/// Reads the tree format's `f32` words from a byte buffer, left to right.
///
/// Words are little-endian on the wire. `f32::from_le_bytes` swaps them on
/// big-endian hosts, so decoding is host-independent.
#[derive(Debug, Clone)]
pub struct FloatReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> FloatReader<'a> {
    /// Creates a reader positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Returns `true` once every byte has been consumed.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    /// Current byte offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    /// Reads one raw `f32` word.
    pub fn next_f32(&mut self) -> DecodeResult<f32> {
        let end = self.offset + WORD_SIZE;
        let word: [u8; WORD_SIZE] = self
            .bytes
            .get(self.offset..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(DecodeError::Truncated {
                offset: self.offset,
                needed: WORD_SIZE,
                len: self.bytes.len(),
            })?;
        self.offset = end;
        Ok(f32::from_le_bytes(word))
    }

    /// Reads one word, widened to `f64`.
    #[inline]
    pub fn next(&mut self) -> DecodeResult<f64> {
        self.next_f32().map(f64::from)
    }

    /// Reads three words as a vector.
    pub fn next_vector(&mut self) -> DecodeResult<Vector3<f64>> {
        let x = self.next()?;
        let y = self.next()?;
        let z = self.next()?;
        Ok(Vector3::new(x, y, z))
    }

    /// Reads three words as a point.
    #[inline]
    pub fn next_point(&mut self) -> DecodeResult<Point3<f64>> {
        self.next_vector().map(Point3::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn reads_little_endian_words() {
        let bytes = words(&[1.5, -2.0, 0.25]);
        let mut reader = FloatReader::new(&bytes);
        assert!(!reader.is_done());
        assert_eq!(reader.next().unwrap(), 1.5);
        assert_eq!(reader.offset(), 4);
        assert_eq!(reader.remaining(), 8);
        assert!(reader.next_vector().is_err());
    }

    #[test]
    fn explicit_byte_order() {
        // 1.0f32 is 0x3f800000; little-endian puts the low byte first.
        let bytes = [0x00, 0x00, 0x80, 0x3f];
        let mut reader = FloatReader::new(&bytes);
        assert_eq!(reader.next_f32().unwrap(), 1.0);
        assert!(reader.is_done());
    }

    #[test]
    fn vector_and_point() {
        let bytes = words(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut reader = FloatReader::new(&bytes);
        assert_eq!(reader.next_vector().unwrap(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(reader.next_point().unwrap(), Point3::new(4.0, 5.0, 6.0));
        assert!(reader.is_done());
    }

    #[test]
    fn read_past_end_is_truncated() {
        let bytes = [0u8; 6];
        let mut reader = FloatReader::new(&bytes);
        reader.next().unwrap();
        assert_eq!(
            reader.next(),
            Err(DecodeError::Truncated {
                offset: 4,
                needed: 4,
                len: 6
            })
        );
        // A failed read does not advance.
        assert_eq!(reader.offset(), 4);
    }
}
