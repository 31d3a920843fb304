// Licensed under the Apache-2.0 license

use crate::codec::PldmCodecError;
use crate::protocol::platform::SensorDataSize;
use core::fmt;
use zerocopy::{FromBytes, IntoBytes, I16, I32, LE, U16, U32};

/// A numeric sensor value together with the data size it was decoded with.
///
/// The bytes of a reading do not describe their own width, so a value only
/// exists paired with its `SensorDataSize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorReading {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
}

impl SensorReading {
    /// Decodes a little endian value of the width selected by `size` from the
    /// start of `bytes`. Bytes beyond that width are not looked at.
    pub fn decode(size: SensorDataSize, bytes: &[u8]) -> Result<Self, PldmCodecError> {
        let reading = match size {
            SensorDataSize::UInt8 => SensorReading::U8(read::<u8>(bytes)?),
            SensorDataSize::SInt8 => SensorReading::I8(read::<i8>(bytes)?),
            SensorDataSize::UInt16 => SensorReading::U16(read::<U16<LE>>(bytes)?.get()),
            SensorDataSize::SInt16 => SensorReading::I16(read::<I16<LE>>(bytes)?.get()),
            SensorDataSize::UInt32 => SensorReading::U32(read::<U32<LE>>(bytes)?.get()),
            SensorDataSize::SInt32 => SensorReading::I32(read::<I32<LE>>(bytes)?.get()),
        };
        Ok(reading)
    }

    /// Reinterprets a raw field of the PDR tail (already of the right width)
    /// with the signedness of `size`.
    pub fn from_raw(size: SensorDataSize, raw: u32) -> Self {
        match size {
            SensorDataSize::UInt8 => SensorReading::U8(raw as u8),
            SensorDataSize::SInt8 => SensorReading::I8(raw as u8 as i8),
            SensorDataSize::UInt16 => SensorReading::U16(raw as u16),
            SensorDataSize::SInt16 => SensorReading::I16(raw as u16 as i16),
            SensorDataSize::UInt32 => SensorReading::U32(raw),
            SensorDataSize::SInt32 => SensorReading::I32(raw as i32),
        }
    }

    pub fn data_size(&self) -> SensorDataSize {
        match self {
            SensorReading::U8(_) => SensorDataSize::UInt8,
            SensorReading::I8(_) => SensorDataSize::SInt8,
            SensorReading::U16(_) => SensorDataSize::UInt16,
            SensorReading::I16(_) => SensorDataSize::SInt16,
            SensorReading::U32(_) => SensorDataSize::UInt32,
            SensorReading::I32(_) => SensorDataSize::SInt32,
        }
    }

    /// Writes the value in little endian order, returning the bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError> {
        let width = self.data_size().width();
        let out = buffer
            .get_mut(..width)
            .ok_or(PldmCodecError::BufferTooShort)?;
        match *self {
            SensorReading::U8(v) => out.copy_from_slice(v.as_bytes()),
            SensorReading::I8(v) => out.copy_from_slice(v.as_bytes()),
            SensorReading::U16(v) => out.copy_from_slice(U16::<LE>::new(v).as_bytes()),
            SensorReading::I16(v) => out.copy_from_slice(I16::<LE>::new(v).as_bytes()),
            SensorReading::U32(v) => out.copy_from_slice(U32::<LE>::new(v).as_bytes()),
            SensorReading::I32(v) => out.copy_from_slice(I32::<LE>::new(v).as_bytes()),
        }
        Ok(width)
    }

    pub fn as_i64(&self) -> i64 {
        match *self {
            SensorReading::U8(v) => v as i64,
            SensorReading::I8(v) => v as i64,
            SensorReading::U16(v) => v as i64,
            SensorReading::I16(v) => v as i64,
            SensorReading::U32(v) => v as i64,
            SensorReading::I32(v) => v as i64,
        }
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

fn read<T: FromBytes>(bytes: &[u8]) -> Result<T, PldmCodecError> {
    T::read_from_prefix(bytes)
        .map(|(value, _)| value)
        .map_err(|_| PldmCodecError::BufferTooShort)
}
