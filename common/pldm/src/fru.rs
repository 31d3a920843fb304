// Licensed under the Apache-2.0 license

//! FRU record table decode (DSP0257).
//!
//! A table is a run of records, each a fixed 5 byte header followed by
//! `num_fields` type-length-value fields. Field order is kept as received.

use crate::codec::{PldmCodec, PldmCodecError};
use crate::error::PldmError;
use core::convert::TryFrom;
use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U16};

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct FruRecordHeader {
    pub record_set_id: U16<LE>,
    pub record_type: u8,
    pub num_fields: u8,
    pub encoding: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FruRecordType {
    General = 1,
    Oem = 254,
}

impl TryFrom<u8> for FruRecordType {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            1 => Ok(FruRecordType::General),
            254 => Ok(FruRecordType::Oem),
            _ => Err(PldmError::InvalidFruRecordType(value)),
        }
    }
}

/// String encodings a record may declare for its fields (DSP0257 Table 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FruFieldEncoding {
    Unspecified = 0,
    Ascii = 1,
    Utf8 = 2,
    Utf16 = 3,
    Utf16Le = 4,
    Utf16Be = 5,
}

impl FruFieldEncoding {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FruFieldEncoding::Unspecified),
            1 => Some(FruFieldEncoding::Ascii),
            2 => Some(FruFieldEncoding::Utf8),
            3 => Some(FruFieldEncoding::Utf16),
            4 => Some(FruFieldEncoding::Utf16Le),
            5 => Some(FruFieldEncoding::Utf16Be),
            _ => None,
        }
    }
}

/// Field type of a FRU TLV. General record types are named; OEM records
/// define their own numbering so their codes are kept raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FruFieldType {
    ChassisType,
    Model,
    PartNumber,
    SerialNumber,
    Manufacturer,
    ManufactureDate,
    Vendor,
    Name,
    Sku,
    Version,
    AssetTag,
    Description,
    EngineeringChangeLevel,
    Other,
    VendorIana,
    Unknown(u8),
    Oem(u8),
}

impl FruFieldType {
    pub fn new(record_type: FruRecordType, code: u8) -> Self {
        if record_type == FruRecordType::Oem {
            return FruFieldType::Oem(code);
        }
        match code {
            1 => FruFieldType::ChassisType,
            2 => FruFieldType::Model,
            3 => FruFieldType::PartNumber,
            4 => FruFieldType::SerialNumber,
            5 => FruFieldType::Manufacturer,
            6 => FruFieldType::ManufactureDate,
            7 => FruFieldType::Vendor,
            8 => FruFieldType::Name,
            9 => FruFieldType::Sku,
            10 => FruFieldType::Version,
            11 => FruFieldType::AssetTag,
            12 => FruFieldType::Description,
            13 => FruFieldType::EngineeringChangeLevel,
            14 => FruFieldType::Other,
            15 => FruFieldType::VendorIana,
            other => FruFieldType::Unknown(other),
        }
    }

    pub fn code(&self) -> u8 {
        match *self {
            FruFieldType::ChassisType => 1,
            FruFieldType::Model => 2,
            FruFieldType::PartNumber => 3,
            FruFieldType::SerialNumber => 4,
            FruFieldType::Manufacturer => 5,
            FruFieldType::ManufactureDate => 6,
            FruFieldType::Vendor => 7,
            FruFieldType::Name => 8,
            FruFieldType::Sku => 9,
            FruFieldType::Version => 10,
            FruFieldType::AssetTag => 11,
            FruFieldType::Description => 12,
            FruFieldType::EngineeringChangeLevel => 13,
            FruFieldType::Other => 14,
            FruFieldType::VendorIana => 15,
            FruFieldType::Unknown(code) | FruFieldType::Oem(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FruField {
    pub field_type: FruFieldType,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FruRecord {
    pub record_set_id: u16,
    pub record_type: FruRecordType,
    pub encoding: u8,
    pub fields: Vec<FruField>,
}

impl FruRecord {
    /// Decodes one record from the start of `bytes`, returning the rest.
    pub fn parse(bytes: &[u8]) -> Result<(Self, &[u8]), PldmError> {
        let (header, mut rest) = FruRecordHeader::read_from_prefix(bytes)
            .map_err(|_| PldmError::Codec(PldmCodecError::BufferTooShort))?;
        let record_type = FruRecordType::try_from(header.record_type)?;
        let mut fields = Vec::with_capacity(header.num_fields as usize);
        for _ in 0..header.num_fields {
            let [code, len, tail @ ..] = rest else {
                return Err(PldmError::InvalidLength);
            };
            let len = *len as usize;
            if tail.len() < len {
                return Err(PldmError::InvalidLength);
            }
            fields.push(FruField {
                field_type: FruFieldType::new(record_type, *code),
                value: tail[..len].to_vec(),
            });
            rest = &tail[len..];
        }
        Ok((
            FruRecord {
                record_set_id: header.record_set_id.get(),
                record_type,
                encoding: header.encoding,
                fields,
            },
            rest,
        ))
    }

    /// First field of the given type, if any.
    pub fn field(&self, field_type: FruFieldType) -> Option<&FruField> {
        self.fields.iter().find(|f| f.field_type == field_type)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PldmCodecError> {
        if self.fields.len() > u8::MAX as usize {
            return Err(PldmCodecError::Unsupported);
        }
        let header = FruRecordHeader {
            record_set_id: U16::new(self.record_set_id),
            record_type: self.record_type as u8,
            num_fields: self.fields.len() as u8,
            encoding: self.encoding,
        };
        let mut bytes = vec![0u8; core::mem::size_of::<FruRecordHeader>()];
        header.encode(&mut bytes)?;
        for field in &self.fields {
            if field.value.len() > u8::MAX as usize {
                return Err(PldmCodecError::Unsupported);
            }
            bytes.push(field.field_type.code());
            bytes.push(field.value.len() as u8);
            bytes.extend_from_slice(&field.value);
        }
        Ok(bytes)
    }
}

pub fn parse_fru_record_table(mut bytes: &[u8]) -> Result<Vec<FruRecord>, PldmError> {
    let mut records = Vec::new();
    while !bytes.is_empty() {
        let (record, rest) = FruRecord::parse(bytes)?;
        records.push(record);
        bytes = rest;
    }
    Ok(records)
}
