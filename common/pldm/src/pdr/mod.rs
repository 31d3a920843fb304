// Licensed under the Apache-2.0 license

//! Structural decode of Platform Data Records as returned by GetPDR.

pub mod aux_names;
pub mod fru_record_set;
pub mod numeric_sensor;

use crate::codec::{PldmCodec, PldmCodecError};
use crate::error::PldmError;
use crate::protocol::platform::PdrType;
use aux_names::SensorAuxNamesPdr;
use core::convert::TryFrom;
use fru_record_set::FruRecordSetPdr;
use numeric_sensor::{NumericSensorPdr, NumericSensorPdrFixed};
use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U16, U32};

pub const PDR_HEADER_LEN: usize = core::mem::size_of::<PdrHeader>();
pub const PDR_HEADER_VERSION: u8 = 0x01;

/// Common header in front of every PDR (DSP0248 Table 75).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct PdrHeader {
    pub record_handle: U32<LE>,
    pub header_version: u8,
    pub pdr_type: u8,
    pub record_change_number: U16<LE>,
    pub data_length: U16<LE>,
}

impl PdrHeader {
    pub fn new(record_handle: u32, pdr_type: PdrType, record_change_number: u16, data_length: u16) -> Self {
        PdrHeader {
            record_handle: U32::new(record_handle),
            header_version: PDR_HEADER_VERSION,
            pdr_type: pdr_type as u8,
            record_change_number: U16::new(record_change_number),
            data_length: U16::new(data_length),
        }
    }

    pub fn record_handle(&self) -> u32 {
        self.record_handle.get()
    }

    pub fn record_change_number(&self) -> u16 {
        self.record_change_number.get()
    }

    pub fn data_length(&self) -> usize {
        self.data_length.get() as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PdrBody {
    NumericSensor(NumericSensorPdr),
    SensorAuxiliaryNames(SensorAuxNamesPdr),
    FruRecordSet(FruRecordSetPdr),
    /// A known PDR type whose body is not decoded further.
    Raw { pdr_type: PdrType, data: Vec<u8> },
}

impl PdrBody {
    pub fn pdr_type(&self) -> PdrType {
        match self {
            PdrBody::NumericSensor(_) => PdrType::NumericSensor,
            PdrBody::SensorAuxiliaryNames(_) => PdrType::SensorAuxiliaryNames,
            PdrBody::FruRecordSet(_) => PdrType::FruRecordSet,
            PdrBody::Raw { pdr_type, .. } => *pdr_type,
        }
    }

    fn parse(pdr_type: PdrType, data: &[u8]) -> Result<Self, PldmError> {
        let body = match pdr_type {
            PdrType::NumericSensor => PdrBody::NumericSensor(NumericSensorPdr::parse(data)?),
            PdrType::SensorAuxiliaryNames => {
                PdrBody::SensorAuxiliaryNames(SensorAuxNamesPdr::parse(data)?)
            }
            PdrType::FruRecordSet => PdrBody::FruRecordSet(FruRecordSetPdr::decode(data)?),
            _ => PdrBody::Raw {
                pdr_type,
                data: data.to_vec(),
            },
        };
        Ok(body)
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            PdrBody::NumericSensor(pdr) => {
                core::mem::size_of::<NumericSensorPdrFixed>() + pdr.tail().encoded_len()
            }
            PdrBody::SensorAuxiliaryNames(pdr) => pdr.encoded_len(),
            PdrBody::FruRecordSet(_) => core::mem::size_of::<FruRecordSetPdr>(),
            PdrBody::Raw { data, .. } => data.len(),
        }
    }

    fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError> {
        match self {
            PdrBody::NumericSensor(pdr) => pdr.encode(buffer),
            PdrBody::SensorAuxiliaryNames(pdr) => pdr.encode(buffer),
            PdrBody::FruRecordSet(pdr) => pdr.encode(buffer),
            PdrBody::Raw { data, .. } => {
                let out = buffer
                    .get_mut(..data.len())
                    .ok_or(PldmCodecError::BufferTooShort)?;
                out.copy_from_slice(data);
                Ok(data.len())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pdr {
    pub header: PdrHeader,
    pub body: PdrBody,
}

impl Pdr {
    /// Decodes one record from the start of `bytes` and returns it with the
    /// bytes that follow it.
    ///
    /// The body is limited to the header's `data_length`, so a body decoder
    /// never reads into the next record.
    pub fn parse(bytes: &[u8]) -> Result<(Self, &[u8]), PldmError> {
        let (header, rest) = PdrHeader::read_from_prefix(bytes)
            .map_err(|_| PldmError::Codec(PldmCodecError::BufferTooShort))?;
        let data_length = header.data_length();
        if rest.len() < data_length {
            return Err(PldmError::InvalidLength);
        }
        let (data, rest) = rest.split_at(data_length);
        let pdr_type = PdrType::try_from(header.pdr_type)?;
        let body = PdrBody::parse(pdr_type, data)?;
        Ok((Pdr { header, body }, rest))
    }

    /// Builds a record around `body`, filling in the header's type and length.
    pub fn new(record_handle: u32, record_change_number: u16, body: PdrBody) -> Result<Self, PldmCodecError> {
        let data_length = body.encoded_len();
        if data_length > u16::MAX as usize {
            return Err(PldmCodecError::Unsupported);
        }
        Ok(Pdr {
            header: PdrHeader::new(
                record_handle,
                body.pdr_type(),
                record_change_number,
                data_length as u16,
            ),
            body,
        })
    }

    pub fn record_handle(&self) -> u32 {
        self.header.record_handle()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PldmCodecError> {
        let mut bytes = vec![0u8; PDR_HEADER_LEN + self.header.data_length()];
        let header_len = self.header.encode(&mut bytes)?;
        self.body.encode(&mut bytes[header_len..])?;
        Ok(bytes)
    }
}

/// Walks concatenated records, such as the assembled output of a table
/// transfer.
pub fn parse_pdr_table(mut bytes: &[u8]) -> Result<Vec<Pdr>, PldmError> {
    let mut pdrs = Vec::new();
    while !bytes.is_empty() {
        let (pdr, rest) = Pdr::parse(bytes)?;
        pdrs.push(pdr);
        bytes = rest;
    }
    Ok(pdrs)
}
