// Licensed under the Apache-2.0 license

use crate::codec::{PldmCodec, PldmCodecError};
use crate::error::PldmError;
use crate::protocol::base::{
    decode_response, InstanceId, PldmMsgHeader, PldmMsgType, PldmSupportedType,
    TransferOperationFlag, TransferRespFlag, PLDM_MSG_HEADER_LEN,
};
use crate::protocol::platform::PlatformCmd;
use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U16, U32};

pub const GET_PDR_RESPONSE_FIXED_LEN: usize = core::mem::size_of::<GetPdrResponseFixed>();

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct GetPdrRequest {
    pub hdr: PldmMsgHeader<[u8; PLDM_MSG_HEADER_LEN]>,
    pub record_handle: U32<LE>,
    pub data_transfer_handle: U32<LE>,
    pub transfer_operation_flag: u8,
    pub request_count: U16<LE>,
    pub record_change_number: U16<LE>,
}

impl GetPdrRequest {
    pub fn new(
        instance_id: InstanceId,
        record_handle: u32,
        data_transfer_handle: u32,
        transfer_operation_flag: TransferOperationFlag,
        request_count: u16,
        record_change_number: u16,
    ) -> Self {
        GetPdrRequest {
            hdr: PldmMsgHeader::new(
                instance_id,
                PldmMsgType::Request,
                PldmSupportedType::Platform,
                PlatformCmd::GetPdr as u8,
            ),
            record_handle: U32::new(record_handle),
            data_transfer_handle: U32::new(data_transfer_handle),
            transfer_operation_flag: transfer_operation_flag as u8,
            request_count: U16::new(request_count),
            record_change_number: U16::new(record_change_number),
        }
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct GetPdrResponseFixed {
    pub hdr: PldmMsgHeader<[u8; PLDM_MSG_HEADER_LEN]>,
    pub completion_code: u8,
    pub next_record_handle: U32<LE>,
    pub next_data_transfer_handle: U32<LE>,
    pub transfer_flag: u8,
    pub response_count: U16<LE>,
}

/// One part of a PDR transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct GetPdrResponse {
    pub fixed: GetPdrResponseFixed,
    pub record_data: Vec<u8>,
    /// Only sent with the `End` part of a multi-part transfer.
    pub transfer_crc: Option<u8>,
}

impl GetPdrResponse {
    pub fn new(
        instance_id: InstanceId,
        completion_code: u8,
        next_record_handle: u32,
        next_data_transfer_handle: u32,
        transfer_flag: TransferRespFlag,
        record_data: &[u8],
    ) -> Self {
        GetPdrResponse {
            fixed: GetPdrResponseFixed {
                hdr: PldmMsgHeader::new(
                    instance_id,
                    PldmMsgType::Response,
                    PldmSupportedType::Platform,
                    PlatformCmd::GetPdr as u8,
                ),
                completion_code,
                next_record_handle: U32::new(next_record_handle),
                next_data_transfer_handle: U32::new(next_data_transfer_handle),
                transfer_flag: transfer_flag as u8,
                response_count: U16::new(record_data.len() as u16),
            },
            record_data: record_data.to_vec(),
            transfer_crc: None,
        }
    }

    /// Decodes a full response message after checking the command echo and
    /// completion code.
    pub fn parse(buffer: &[u8]) -> Result<Self, PldmError> {
        decode_response(buffer, PlatformCmd::GetPdr as u8)?;
        let (fixed, rest) = GetPdrResponseFixed::read_from_prefix(buffer)
            .map_err(|_| PldmError::Codec(PldmCodecError::BufferTooShort))?;
        let transfer_flag = TransferRespFlag::try_from(fixed.transfer_flag)?;
        let count = fixed.response_count.get() as usize;
        let record_data = rest.get(..count).ok_or(PldmError::InvalidLength)?;
        let transfer_crc = match (transfer_flag, rest.get(count)) {
            (TransferRespFlag::End, Some(crc)) => Some(*crc),
            _ => None,
        };
        Ok(GetPdrResponse {
            fixed,
            record_data: record_data.to_vec(),
            transfer_crc,
        })
    }

    pub fn next_record_handle(&self) -> u32 {
        self.fixed.next_record_handle.get()
    }

    pub fn next_data_transfer_handle(&self) -> u32 {
        self.fixed.next_data_transfer_handle.get()
    }

    pub fn transfer_flag(&self) -> Result<TransferRespFlag, PldmError> {
        TransferRespFlag::try_from(self.fixed.transfer_flag)
    }

    pub fn with_transfer_crc(mut self, crc: u8) -> Self {
        self.transfer_crc = Some(crc);
        self
    }
}

impl PldmCodec for GetPdrResponse {
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError> {
        let fixed_len = self.fixed.encode(buffer)?;
        let data_end = fixed_len + self.record_data.len();
        let crc_len = self.transfer_crc.map_or(0, |_| 1);
        if buffer.len() < data_end + crc_len {
            return Err(PldmCodecError::BufferTooShort);
        }
        buffer[fixed_len..data_end].copy_from_slice(&self.record_data);
        if let Some(crc) = self.transfer_crc {
            buffer[data_end] = crc;
        }
        Ok(data_end + crc_len)
    }

    fn decode(buffer: &[u8]) -> Result<Self, PldmCodecError> {
        let (fixed, rest) = GetPdrResponseFixed::read_from_prefix(buffer)
            .map_err(|_| PldmCodecError::BufferTooShort)?;
        let count = fixed.response_count.get() as usize;
        let record_data = rest.get(..count).ok_or(PldmCodecError::BufferTooShort)?;
        let transfer_crc = match fixed.transfer_flag {
            flag if flag == TransferRespFlag::End as u8 => rest.get(count).copied(),
            _ => None,
        };
        Ok(GetPdrResponse {
            fixed,
            record_data: record_data.to_vec(),
            transfer_crc,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol::platform::GetPdrCompletionCode;

    #[test]
    fn test_get_pdr_request_layout() {
        let request = GetPdrRequest::new(
            0x01,
            0x0000_0102,
            0x0A0B_0C0D,
            TransferOperationFlag::GetFirstPart,
            128,
            0x3344,
        );
        let mut buffer = [0u8; 16];
        assert_eq!(request.encode(&mut buffer).unwrap(), 16);
        assert_eq!(
            buffer,
            [
                0x81, 0x02, 0x51, // header
                0x02, 0x01, 0x00, 0x00, // record handle
                0x0D, 0x0C, 0x0B, 0x0A, // data transfer handle
                0x01, // transfer operation flag
                0x80, 0x00, // request count
                0x44, 0x33, // record change number
            ]
        );
        assert_eq!(GetPdrRequest::decode(&buffer).unwrap(), request);
    }

    #[test]
    fn test_get_pdr_response() {
        let response =
            GetPdrResponse::new(0x01, 0x00, 0x0000_0002, 0, TransferRespFlag::StartAndEnd, &[1, 2, 3]);
        let mut buffer = [0u8; 64];
        let len = response.encode(&mut buffer).unwrap();
        assert_eq!(len, GET_PDR_RESPONSE_FIXED_LEN + 3);

        let parsed = GetPdrResponse::parse(&buffer[..len]).unwrap();
        assert_eq!(parsed, response);
        assert_eq!(parsed.next_record_handle(), 2);
        assert_eq!(parsed.transfer_flag().unwrap(), TransferRespFlag::StartAndEnd);
        assert_eq!(parsed.record_data, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_pdr_response_end_part_crc() {
        let response = GetPdrResponse::new(0x01, 0x00, 0, 0, TransferRespFlag::End, &[9, 9])
            .with_transfer_crc(0x5A);
        let mut buffer = [0u8; 64];
        let len = response.encode(&mut buffer).unwrap();
        let parsed = GetPdrResponse::parse(&buffer[..len]).unwrap();
        assert_eq!(parsed.transfer_crc, Some(0x5A));
        assert_eq!(parsed.record_data, vec![9, 9]);
    }

    #[test]
    fn test_get_pdr_response_truncated_data() {
        let response = GetPdrResponse::new(0x01, 0x00, 0, 0, TransferRespFlag::Start, &[1, 2, 3, 4]);
        let mut buffer = [0u8; 64];
        let len = response.encode(&mut buffer).unwrap();
        assert_eq!(
            GetPdrResponse::parse(&buffer[..len - 1]),
            Err(PldmError::InvalidLength)
        );
    }

    #[test]
    fn test_get_pdr_response_failure() {
        let buffer = [
            0x01,
            0x02,
            0x51,
            GetPdrCompletionCode::InvalidRecordChangeNumber as u8,
        ];
        assert_eq!(
            GetPdrResponse::parse(&buffer),
            Err(PldmError::BadCompletionCode(0x83))
        );
    }
}
