// Licensed under the Apache-2.0 license

use zerocopy::{FromBytes, Immutable, IntoBytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CucCodecError {
    BufferTooShort,
    /// Fewer bytes than the `[cmd][count][type]` envelope.
    Truncated,
    /// `count` disagrees with the bytes that follow it.
    LengthMismatch,
    PayloadTooLarge,
    /// A request field is outside the range the uC accepts.
    InvalidArgument,
    UnknownCommand(u8),
    UnknownPacketType(u8),
    UnknownStatus(u8),
    UnknownBoardType(u8),
}

/// Encoding and decoding of uC packet payloads.
pub trait CucCodec: core::fmt::Debug + Sized {
    /// Encodes the payload into `buffer`, returning the number of bytes written.
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, CucCodecError>;

    /// Decodes the payload from the start of `buffer`.
    fn decode(buffer: &[u8]) -> Result<Self, CucCodecError>;
}

// Fixed-size payloads get their codec from zerocopy.
impl<T> CucCodec for T
where
    T: core::fmt::Debug + Sized + FromBytes + IntoBytes + Immutable,
{
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, CucCodecError> {
        self.write_to_prefix(buffer)
            .map_err(|_| CucCodecError::BufferTooShort)
            .map(|_| core::mem::size_of::<T>())
    }

    fn decode(buffer: &[u8]) -> Result<Self, CucCodecError> {
        Ok(Self::read_from_prefix(buffer)
            .map_err(|_| CucCodecError::BufferTooShort)?
            .0)
    }
}
