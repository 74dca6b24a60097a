use std::ops::Range;

use super::error::F1Error;
use super::layout;
use crate::protocols::common::reader::fixed;

/// Bounds-checked little-endian access to an F1 datagram or one car record.
pub struct F1Reader<'a> {
    payload: &'a [u8],
}

impl<'a> F1Reader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_header(&self) -> Result<(), F1Error> {
        if self.payload.len() < layout::HEADER_LEN {
            return Err(F1Error::TooSmallForHeader {
                needed: layout::HEADER_LEN,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn require_car_telemetry(&self) -> Result<(), F1Error> {
        if self.payload.len() < layout::CAR_TELEMETRY_LEN {
            return Err(F1Error::TooSmallForPayload {
                needed: layout::CAR_TELEMETRY_LEN,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    /// Reader scoped to the record of car `index`.
    pub fn car_record(&self, index: u8) -> Result<F1Reader<'a>, F1Error> {
        if usize::from(index) >= layout::MAX_CARS {
            return Err(F1Error::IndexOutOfRange {
                index,
                max: layout::MAX_CARS,
            });
        }
        let record = self.read_slice(layout::car_record_range(usize::from(index)))?;
        Ok(F1Reader::new(record))
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, F1Error> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(F1Error::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8, F1Error> {
        self.read_u8(offset).map(|value| value as i8)
    }

    pub fn read_u16_le(&self, range: Range<usize>) -> Result<u16, F1Error> {
        self.read_fixed(range).map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&self, range: Range<usize>) -> Result<u32, F1Error> {
        self.read_fixed(range).map(u32::from_le_bytes)
    }

    pub fn read_u64_le(&self, range: Range<usize>) -> Result<u64, F1Error> {
        self.read_fixed(range).map(u64::from_le_bytes)
    }

    /// IEEE-754 single from its little-endian bit pattern.
    pub fn read_f32_le(&self, range: Range<usize>) -> Result<f32, F1Error> {
        self.read_fixed(range).map(f32::from_le_bytes)
    }

    pub fn read_u8_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], F1Error> {
        self.read_fixed(offset..offset + N)
    }

    pub fn read_u16_le_array<const N: usize>(&self, offset: usize) -> Result<[u16; N], F1Error> {
        let mut values = [0u16; N];
        for (idx, value) in values.iter_mut().enumerate() {
            let start = offset + idx * 2;
            *value = self.read_u16_le(start..start + 2)?;
        }
        Ok(values)
    }

    pub fn read_f32_le_array<const N: usize>(&self, offset: usize) -> Result<[f32; N], F1Error> {
        let mut values = [0f32; N];
        for (idx, value) in values.iter_mut().enumerate() {
            let start = offset + idx * 4;
            *value = self.read_f32_le(start..start + 4)?;
        }
        Ok(values)
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], F1Error> {
        self.payload.get(range.clone()).ok_or(F1Error::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    fn read_fixed<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], F1Error> {
        let bytes = self.read_slice(range)?;
        fixed(bytes).ok_or(F1Error::TooShort {
            needed: N,
            actual: bytes.len(),
        })
    }
}
