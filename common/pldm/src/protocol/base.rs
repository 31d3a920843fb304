// Licensed under the Apache-2.0 license

use crate::codec::PldmCodec;
use crate::error::PldmError;
use bitfield::bitfield;
use core::convert::TryFrom;
use zerocopy::{FromBytes, Immutable, IntoBytes};

pub const PLDM_MSG_HEADER_LEN: usize = 3;
pub const PLDM_FAILURE_RESP_LEN: usize = 4;
pub const PLDM_INSTANCE_ID_MAX: u8 = 0x1F;
pub type InstanceId = u8;

/// PLDM type codes (DSP0245 Table 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PldmSupportedType {
    Base = 0x00,
    Smbios = 0x01,
    Platform = 0x02,
    Bios = 0x03,
    Fru = 0x04,
    FwUpdate = 0x05,
    Redfish = 0x06,
    Oem = 0x3F,
}

impl TryFrom<u8> for PldmSupportedType {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0x00 => Ok(PldmSupportedType::Base),
            0x01 => Ok(PldmSupportedType::Smbios),
            0x02 => Ok(PldmSupportedType::Platform),
            0x03 => Ok(PldmSupportedType::Bios),
            0x04 => Ok(PldmSupportedType::Fru),
            0x05 => Ok(PldmSupportedType::FwUpdate),
            0x06 => Ok(PldmSupportedType::Redfish),
            0x3F => Ok(PldmSupportedType::Oem),
            _ => Err(PldmError::UnsupportedPldmType),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PldmMsgType {
    Response = 0x00,
    Reserved = 0x01,
    Request = 0x02,
    AsyncRequestNotify = 0x03,
}

impl TryFrom<u8> for PldmMsgType {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0x00 => Ok(PldmMsgType::Response),
            0x01 => Ok(PldmMsgType::Reserved),
            0x02 => Ok(PldmMsgType::Request),
            0x03 => Ok(PldmMsgType::AsyncRequestNotify),
            _ => Err(PldmError::InvalidMsgType),
        }
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum PldmHeaderVersion {
    Version0 = 0x00,
}

/// Generic completion codes (DSP0240 Table 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PldmBaseCompletionCode {
    Success = 0x00,
    Error = 0x01,
    InvalidData = 0x02,
    InvalidLength = 0x03,
    NotReady = 0x04,
    UnsupportedPldmCmd = 0x05,
    InvalidPldmType = 0x06,
}

pub const PLDM_CMD_SPECIFIC_COMPLETION_CODE_START: u8 = 0x80;

impl TryFrom<u8> for PldmBaseCompletionCode {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0x00 => Ok(PldmBaseCompletionCode::Success),
            0x01 => Ok(PldmBaseCompletionCode::Error),
            0x02 => Ok(PldmBaseCompletionCode::InvalidData),
            0x03 => Ok(PldmBaseCompletionCode::InvalidLength),
            0x04 => Ok(PldmBaseCompletionCode::NotReady),
            0x05 => Ok(PldmBaseCompletionCode::UnsupportedPldmCmd),
            0x06 => Ok(PldmBaseCompletionCode::InvalidPldmType),
            _ => Err(PldmError::InvalidCompletionCode),
        }
    }
}

/// A completion code as seen on the wire: one of the generic codes or a
/// value from the open command-specific range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PldmCompletionCode {
    Base(PldmBaseCompletionCode),
    CommandSpecific(u8),
    Reserved(u8),
}

impl From<u8> for PldmCompletionCode {
    fn from(value: u8) -> Self {
        match PldmBaseCompletionCode::try_from(value) {
            Ok(code) => PldmCompletionCode::Base(code),
            Err(_) if value >= PLDM_CMD_SPECIFIC_COMPLETION_CODE_START => {
                PldmCompletionCode::CommandSpecific(value)
            }
            Err(_) => PldmCompletionCode::Reserved(value),
        }
    }
}

impl PldmCompletionCode {
    pub fn is_success(&self) -> bool {
        *self == PldmCompletionCode::Base(PldmBaseCompletionCode::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransferOperationFlag {
    GetNextPart = 0,
    GetFirstPart = 1,
}

impl TryFrom<u8> for TransferOperationFlag {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0 => Ok(TransferOperationFlag::GetNextPart),
            1 => Ok(TransferOperationFlag::GetFirstPart),
            _ => Err(PldmError::InvalidTransferOpFlag),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransferRespFlag {
    Start = 0x01,
    Middle = 0x02,
    End = 0x04,
    StartAndEnd = 0x05,
}

impl TransferRespFlag {
    /// True when this part closes the record being transferred.
    pub fn is_last_part(&self) -> bool {
        matches!(self, TransferRespFlag::End | TransferRespFlag::StartAndEnd)
    }
}

impl TryFrom<u8> for TransferRespFlag {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0x01 => Ok(TransferRespFlag::Start),
            0x02 => Ok(TransferRespFlag::Middle),
            0x04 => Ok(TransferRespFlag::End),
            0x05 => Ok(TransferRespFlag::StartAndEnd),
            _ => Err(PldmError::InvalidTransferRespFlag),
        }
    }
}

bitfield! {
    #[repr(C)]
    #[derive(Copy, Clone, FromBytes, IntoBytes, Immutable, PartialEq)]
    pub struct PldmMsgHeader([u8]);
    impl Debug;
    pub u8, instance_id, set_instance_id: 4, 0;
    pub u8, reserved, _: 5, 5;
    pub u8, datagram, set_datagram: 6, 6;
    pub u8, rq, set_rq: 7, 7;
    pub u8, pldm_type, set_pldm_type: 13, 8;
    pub u8, hdr_ver, set_hdr_ver: 15, 14;
    pub u8, cmd_code, set_command_code: 23, 16;
}

impl PldmMsgHeader<[u8; PLDM_MSG_HEADER_LEN]> {
    const DATAGRAM_MASK: u8 = 0x01;
    const REQUEST_MASK: u8 = 0x01 << 1;

    pub fn new(
        instance_id: InstanceId,
        message_type: PldmMsgType,
        pldm_type: PldmSupportedType,
        cmd_code: u8,
    ) -> Self {
        Self::with_raw_type(instance_id, message_type, pldm_type as u8, cmd_code)
    }

    pub(crate) fn with_raw_type(
        instance_id: InstanceId,
        message_type: PldmMsgType,
        pldm_type: u8,
        cmd_code: u8,
    ) -> Self {
        let mut header = PldmMsgHeader([0; PLDM_MSG_HEADER_LEN]);
        header.set_instance_id(instance_id & PLDM_INSTANCE_ID_MAX);
        header.set_datagram(message_type as u8 & Self::DATAGRAM_MASK);
        header.set_rq((message_type as u8 & Self::REQUEST_MASK) >> 1);
        header.set_pldm_type(pldm_type & 0x3F);
        header.set_hdr_ver(PldmHeaderVersion::Version0 as u8);
        header.set_command_code(cmd_code);
        header
    }

    pub fn is_request(&self) -> bool {
        self.rq() == (PldmMsgType::Request as u8 >> 0x01)
    }

    pub fn is_response(&self) -> bool {
        self.rq() == 0 && self.datagram() == 0
    }

    pub fn is_hdr_ver_valid(&self) -> bool {
        self.hdr_ver() == PldmHeaderVersion::Version0 as u8
    }

    // switch the message type to response
    pub fn into_response(&self) -> Self {
        let mut header = *self;
        header.set_rq(PldmMsgType::Response as u8);
        header
    }
}

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct PldmFailureResponse {
    pub hdr: PldmMsgHeader<[u8; PLDM_MSG_HEADER_LEN]>,
    pub completion_code: u8,
}

impl PldmFailureResponse {
    pub fn new(
        instance_id: InstanceId,
        pldm_type: PldmSupportedType,
        cmd_code: u8,
        completion_code: u8,
    ) -> Self {
        let hdr = PldmMsgHeader::new(instance_id, PldmMsgType::Response, pldm_type, cmd_code);
        PldmFailureResponse {
            hdr,
            completion_code,
        }
    }
}

/// A successfully completed PLDM response: its header and the bytes that
/// follow the completion code.
#[derive(Debug, Clone, PartialEq)]
pub struct PldmResponse<'a> {
    pub hdr: PldmMsgHeader<[u8; PLDM_MSG_HEADER_LEN]>,
    pub payload: &'a [u8],
}

/// Builds a PLDM request message: header followed by `body`.
pub fn encode_request(
    pldm_type: PldmSupportedType,
    command_code: u8,
    instance_id: InstanceId,
    body: &[u8],
) -> Vec<u8> {
    let hdr = PldmMsgHeader::new(instance_id, PldmMsgType::Request, pldm_type, command_code);
    let mut message = Vec::with_capacity(PLDM_MSG_HEADER_LEN + body.len());
    message.extend_from_slice(hdr.as_bytes());
    message.extend_from_slice(body);
    message
}

/// Validates a PLDM response against the command it should answer.
///
/// The payload after the completion code is only exposed when the
/// completion code is `Success`.
pub fn decode_response(buffer: &[u8], expected_command: u8) -> Result<PldmResponse<'_>, PldmError> {
    if buffer.len() < PLDM_FAILURE_RESP_LEN {
        return Err(PldmError::ShortHeader);
    }
    let hdr = PldmMsgHeader::<[u8; PLDM_MSG_HEADER_LEN]>::decode(buffer)
        .map_err(|_| PldmError::ShortHeader)?;
    if !hdr.is_response() {
        return Err(PldmError::NotAResponse);
    }
    if hdr.cmd_code() != expected_command {
        return Err(PldmError::CommandMismatch {
            expected: expected_command,
            actual: hdr.cmd_code(),
        });
    }
    let completion_code = buffer[PLDM_MSG_HEADER_LEN];
    if completion_code != PldmBaseCompletionCode::Success as u8 {
        return Err(PldmError::BadCompletionCode(completion_code));
    }
    Ok(PldmResponse {
        hdr,
        payload: &buffer[PLDM_FAILURE_RESP_LEN..],
    })
}
