// Licensed under the Apache-2.0 license

use zerocopy::{FromBytes, Immutable, IntoBytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PldmCodecError {
    BufferTooShort,
    Unsupported,
}

/// Byte-level encoding of PLDM messages and records.
///
/// Fixed-layout types get this through zerocopy. Types with a variable tail
/// (sensor reading responses, GetPDR parts, numeric sensor PDRs) implement it
/// by hand on top of their fixed part.
pub trait PldmCodec: core::fmt::Debug + Sized {
    /// Writes the message to the start of `buffer` and returns its length.
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError>;

    /// Reads the message from the start of `buffer`. Trailing bytes are
    /// ignored.
    fn decode(buffer: &[u8]) -> Result<Self, PldmCodecError>;
}

// Fixed-layout messages get their codec straight from zerocopy.
impl<T> PldmCodec for T
where
    T: core::fmt::Debug + Sized + FromBytes + IntoBytes + Immutable,
{
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError> {
        self.write_to_prefix(buffer)
            .map_err(|_| PldmCodecError::BufferTooShort)
            .map(|_| core::mem::size_of::<T>())
    }

    fn decode(buffer: &[u8]) -> Result<Self, PldmCodecError> {
        Ok(Self::read_from_prefix(buffer)
            .map_err(|_| PldmCodecError::BufferTooShort)?
            .0)
    }
}
