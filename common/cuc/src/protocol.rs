// Licensed under the Apache-2.0 license

use crate::codec::CucCodecError;
use core::convert::TryFrom;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Bytes after `cmd` and `count`: the type byte plus the payload.
pub const CUC_DATA_BYTES: usize = 253;
/// Largest payload a packet can carry once the type byte is accounted for.
pub const CUC_MAX_PAYLOAD: usize = CUC_DATA_BYTES - 1;
pub const CUC_PACKET_HEADER_LEN: usize = core::mem::size_of::<CucPacketHeader>();

/// uC command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CucCommand {
    Ping = 0,
    BoardInfo = 1,
    GetLog = 12,
    GetFru = 25,
    SetFanPwm = 26,
    GetFanRpm = 27,
    GetMac = 29,
    QsfpRead = 31,
    QsfpWrite = 32,
    QsfpReset = 33,
    GetIntr = 34,
    ClearIsr = 35,
    UpdateIer = 36,
    Pldm = 39,
    FirmwareUpdateStart = 46,
    FirmwareVersion = 51,
    FirmwareUpdateDownload = 52,
    FirmwareUpdateStatus = 53,
    Reset = 54,
    SetLed = 58,
    GetNicId = 60,
    GetTimings = 61,
}

impl TryFrom<u8> for CucCommand {
    type Error = CucCodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CucCommand::Ping),
            1 => Ok(CucCommand::BoardInfo),
            12 => Ok(CucCommand::GetLog),
            25 => Ok(CucCommand::GetFru),
            26 => Ok(CucCommand::SetFanPwm),
            27 => Ok(CucCommand::GetFanRpm),
            29 => Ok(CucCommand::GetMac),
            31 => Ok(CucCommand::QsfpRead),
            32 => Ok(CucCommand::QsfpWrite),
            33 => Ok(CucCommand::QsfpReset),
            34 => Ok(CucCommand::GetIntr),
            35 => Ok(CucCommand::ClearIsr),
            36 => Ok(CucCommand::UpdateIer),
            39 => Ok(CucCommand::Pldm),
            46 => Ok(CucCommand::FirmwareUpdateStart),
            51 => Ok(CucCommand::FirmwareVersion),
            52 => Ok(CucCommand::FirmwareUpdateDownload),
            53 => Ok(CucCommand::FirmwareUpdateStatus),
            54 => Ok(CucCommand::Reset),
            58 => Ok(CucCommand::SetLed),
            60 => Ok(CucCommand::GetNicId),
            61 => Ok(CucCommand::GetTimings),
            _ => Err(CucCodecError::UnknownCommand(value)),
        }
    }
}

impl From<CucCommand> for u8 {
    fn from(cmd: CucCommand) -> Self {
        cmd as u8
    }
}

impl CucCommand {
    /// The packet type a successful response to this command carries.
    pub fn success_response_type(&self) -> CucPacketType {
        match self {
            CucCommand::Pldm => CucPacketType::ResponsePldm,
            _ => CucPacketType::ResponseSuccess,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CucPacketType {
    Request = 0,
    ResponseSuccess = 1,
    ResponseError = 2,
    ResponsePldm = 3,
}

impl TryFrom<u8> for CucPacketType {
    type Error = CucCodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CucPacketType::Request),
            1 => Ok(CucPacketType::ResponseSuccess),
            2 => Ok(CucPacketType::ResponseError),
            3 => Ok(CucPacketType::ResponsePldm),
            _ => Err(CucCodecError::UnknownPacketType(value)),
        }
    }
}

impl CucPacketType {
    pub fn is_response(&self) -> bool {
        !matches!(self, CucPacketType::Request)
    }
}

/// The three envelope bytes in front of every payload.
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct CucPacketHeader {
    pub cmd: u8,
    /// Bytes that follow, counting the type byte.
    pub count: u8,
    pub packet_type: u8,
}

/// Payload of a `ResponseError` packet.
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct ErrorResponse {
    /// The POSIX errno that best describes the failure.
    pub error: u8,
}
