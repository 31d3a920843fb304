// Licensed under the Apache-2.0 license

//! Sensor Auxiliary Names PDR (DSP0248 Table 83).

use crate::codec::PldmCodecError;
use crate::error::PldmError;
use zerocopy::{FromBytes, Immutable, IntoBytes, BE, LE, U16};

/// One name of a sensor together with its RFC 5646 language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxName {
    pub language_tag: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorAuxNamesPdr {
    pub terminus_handle: u16,
    pub sensor_id: u16,
    /// Names per sensor in a composite sensor, in record order.
    pub sensor_names: Vec<Vec<AuxName>>,
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
struct SensorAuxNamesFixed {
    terminus_handle: U16<LE>,
    sensor_id: U16<LE>,
    sensor_count: u8,
}

struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], PldmError> {
        if self.data.len() < len {
            return Err(PldmError::InvalidLength);
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    fn read<T: FromBytes>(&mut self) -> Result<T, PldmError> {
        let (value, rest) =
            T::read_from_prefix(self.data).map_err(|_| PldmError::InvalidLength)?;
        self.data = rest;
        Ok(value)
    }

    // Null terminated ASCII.
    fn ascii(&mut self) -> Result<String, PldmError> {
        let end = self
            .data
            .iter()
            .position(|&b| b == 0)
            .ok_or(PldmError::InvalidLength)?;
        let text = self.take(end + 1)?;
        Ok(text[..end].iter().map(|&b| b as char).collect())
    }

    // Null terminated UTF-16 big endian.
    fn utf16_be(&mut self) -> Result<String, PldmError> {
        let mut units = Vec::new();
        loop {
            let unit = self.read::<U16<BE>>()?.get();
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        Ok(String::from_utf16_lossy(&units))
    }
}

impl SensorAuxNamesPdr {
    pub fn parse(data: &[u8]) -> Result<Self, PldmError> {
        let mut reader = Reader { data };
        let fixed = reader.read::<SensorAuxNamesFixed>()?;
        let mut sensor_names = Vec::with_capacity(fixed.sensor_count as usize);
        for _ in 0..fixed.sensor_count {
            let name_count = reader.read::<u8>()?;
            let mut names = Vec::with_capacity(name_count as usize);
            for _ in 0..name_count {
                let language_tag = reader.ascii()?;
                let name = reader.utf16_be()?;
                names.push(AuxName { language_tag, name });
            }
            sensor_names.push(names);
        }
        Ok(SensorAuxNamesPdr {
            terminus_handle: fixed.terminus_handle.get(),
            sensor_id: fixed.sensor_id.get(),
            sensor_names,
        })
    }

    /// First name of the first sensor, which is all the uC ever reports.
    pub fn primary_name(&self) -> Option<&str> {
        self.sensor_names
            .first()
            .and_then(|names| names.first())
            .map(|name| name.name.as_str())
    }

    pub fn encoded_len(&self) -> usize {
        core::mem::size_of::<SensorAuxNamesFixed>()
            + self
            .sensor_names
            .iter()
            .map(|names| {
                1 + names
                    .iter()
                    .map(|n| n.language_tag.len() + 1 + (n.name.encode_utf16().count() + 1) * 2)
                    .sum::<usize>()
            })
            .sum::<usize>()
    }

    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError> {
        let len = self.encoded_len();
        if buffer.len() < len || self.sensor_names.len() > u8::MAX as usize {
            return Err(PldmCodecError::BufferTooShort);
        }
        let mut out = Vec::with_capacity(len);
        let fixed = SensorAuxNamesFixed {
            terminus_handle: U16::new(self.terminus_handle),
            sensor_id: U16::new(self.sensor_id),
            sensor_count: self.sensor_names.len() as u8,
        };
        out.extend_from_slice(fixed.as_bytes());
        for names in &self.sensor_names {
            out.push(names.len() as u8);
            for name in names {
                out.extend_from_slice(name.language_tag.as_bytes());
                out.push(0);
                for unit in name.name.encode_utf16() {
                    out.extend_from_slice(U16::<BE>::new(unit).as_bytes());
                }
                out.extend_from_slice(&[0, 0]);
            }
        }
        buffer[..len].copy_from_slice(&out);
        Ok(len)
    }
}
