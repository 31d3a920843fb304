// Licensed under the Apache-2.0 license

//! QSFP/AOC module access over the uC's I2C bus.

use crate::codec::{CucCodec, CucCodecError};
use crate::protocol::CUC_MAX_PAYLOAD;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Most bytes a QSFP_READ response can return.
pub const QSFP_READ_MAX: usize = CUC_MAX_PAYLOAD;
/// Most bytes a QSFP_WRITE request can carry after its fixed fields.
pub const QSFP_WRITE_MAX: usize = CUC_MAX_PAYLOAD - core::mem::size_of::<QsfpAccess>();

/// Location of a QSFP read or write.
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct QsfpAccess {
    pub nic: u8,
    pub page: u8,
    pub addr: u8,
    pub count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct QsfpReadRequest {
    pub access: QsfpAccess,
}

impl QsfpReadRequest {
    pub fn new(nic: u8, page: u8, addr: u8, count: u8) -> Result<Self, CucCodecError> {
        if count == 0 || count as usize > QSFP_READ_MAX {
            return Err(CucCodecError::InvalidArgument);
        }
        Ok(QsfpReadRequest {
            access: QsfpAccess {
                nic,
                page,
                addr,
                count,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QsfpWriteRequest {
    pub access: QsfpAccess,
    pub data: Vec<u8>,
}

impl QsfpWriteRequest {
    /// `count` is taken from `data`, which must fit in one packet.
    pub fn new(nic: u8, page: u8, addr: u8, data: &[u8]) -> Result<Self, CucCodecError> {
        if data.is_empty() || data.len() > QSFP_WRITE_MAX {
            return Err(CucCodecError::InvalidArgument);
        }
        Ok(QsfpWriteRequest {
            access: QsfpAccess {
                nic,
                page,
                addr,
                count: data.len() as u8,
            },
            data: data.to_vec(),
        })
    }
}

impl CucCodec for QsfpWriteRequest {
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, CucCodecError> {
        if self.access.count as usize != self.data.len() {
            return Err(CucCodecError::InvalidArgument);
        }
        let access_len = self.access.encode(buffer)?;
        let end = access_len + self.data.len();
        buffer
            .get_mut(access_len..end)
            .ok_or(CucCodecError::BufferTooShort)?
            .copy_from_slice(&self.data);
        Ok(end)
    }

    fn decode(buffer: &[u8]) -> Result<Self, CucCodecError> {
        let (access, rest) =
            QsfpAccess::read_from_prefix(buffer).map_err(|_| CucCodecError::BufferTooShort)?;
        let data = rest
            .get(..access.count as usize)
            .ok_or(CucCodecError::BufferTooShort)?;
        Ok(QsfpWriteRequest {
            access,
            data: data.to_vec(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct QsfpResetRequest {
    pub nic: u8,
}
