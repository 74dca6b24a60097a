use std::ops::Range;

use super::error::PcarsError;
use crate::protocols::common::reader::fixed;

pub struct PcarsReader<'a> {
    payload: &'a [u8],
}

impl<'a> PcarsReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, PcarsError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(PcarsError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8, PcarsError> {
        self.read_u8(offset).map(|value| value as i8)
    }

    pub fn read_u32_le(&self, range: Range<usize>) -> Result<u32, PcarsError> {
        self.read_fixed(range).map(u32::from_le_bytes)
    }

    pub fn read_f32_le(&self, range: Range<usize>) -> Result<f32, PcarsError> {
        self.read_fixed(range).map(f32::from_le_bytes)
    }

    /// Prefix of at most `max_len` bytes.
    pub fn truncated(&self, max_len: usize) -> &'a [u8] {
        &self.payload[..self.payload.len().min(max_len)]
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], PcarsError> {
        self.payload.get(range.clone()).ok_or(PcarsError::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    fn read_fixed<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], PcarsError> {
        let bytes = self.read_slice(range)?;
        fixed(bytes).ok_or(PcarsError::TooShort {
            needed: N,
            actual: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PcarsReader;
    use crate::protocols::pcars::error::PcarsError;

    #[test]
    fn reads_build_version_little_endian() {
        let payload = 1122u32.to_le_bytes();
        let reader = PcarsReader::new(&payload);
        assert_eq!(reader.read_u32_le(0..4).unwrap(), 1122);
    }

    #[test]
    fn truncated_caps_length() {
        let payload = [1u8; 10];
        let reader = PcarsReader::new(&payload);
        assert_eq!(reader.truncated(4).len(), 4);
        assert_eq!(reader.truncated(64).len(), 10);
    }

    #[test]
    fn float_read_past_end_fails() {
        let payload = [0u8; 18];
        let reader = PcarsReader::new(&payload);
        let err = reader.read_f32_le(16..20).unwrap_err();
        assert_eq!(
            err,
            PcarsError::TooShort {
                needed: 20,
                actual: 18
            }
        );
    }
}
