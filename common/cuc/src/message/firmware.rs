// Licensed under the Apache-2.0 license

//! Firmware update and version payloads.

use crate::codec::CucCodecError;
use crate::firmware_target::FirmwareTarget;
use crate::protocol::CUC_MAX_PAYLOAD;
use core::convert::TryFrom;
use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U32};

/// Largest image chunk one FIRMWARE_UPDATE_DOWNLOAD packet carries.
pub const FIRMWARE_DOWNLOAD_CHUNK: usize = CUC_MAX_PAYLOAD;

/// Each NIC keeps an active and a recovery copy of its firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FwSlot {
    Active = 0,
    Recovery = 1,
}

impl TryFrom<u8> for FwSlot {
    type Error = CucCodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FwSlot::Active),
            1 => Ok(FwSlot::Recovery),
            _ => Err(CucCodecError::InvalidArgument),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct FirmwareUpdateStartRequest {
    pub nic: u8,
    pub size: U32<LE>,
    pub slot: u8,
}

impl FirmwareUpdateStartRequest {
    pub fn new(nic: u8, size: u32, slot: FwSlot) -> Self {
        FirmwareUpdateStartRequest {
            nic,
            size: U32::new(size),
            slot: slot as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct FirmwareVersionRequest {
    pub fw_target: u8,
    pub nic: u8,
    /// 0 reads the running version, 1 the copy stored in `slot`.
    pub from_flash: u8,
    pub slot: u8,
}

impl FirmwareVersionRequest {
    pub fn running(target: FirmwareTarget, nic: u8) -> Self {
        FirmwareVersionRequest {
            fw_target: target as u8,
            nic,
            from_flash: 0,
            slot: FwSlot::Active as u8,
        }
    }

    pub fn stored(target: FirmwareTarget, nic: u8, slot: FwSlot) -> Self {
        FirmwareVersionRequest {
            fw_target: target as u8,
            nic,
            from_flash: 1,
            slot: slot as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct FirmwareUpdateStatusResponse {
    pub status: u8,
}

impl FirmwareUpdateStatusResponse {
    pub fn state(&self) -> Result<FwUpdateState, CucCodecError> {
        FwUpdateState::try_from(self.status)
    }
}

pub const FWU_STATUS_IDLE: u8 = 0x80;
pub const FWU_STATUS_SUCCESS: u8 = 0x81;

/// Why a firmware update ended in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwUpdateFailure {
    BadDownload,
    BadSignature,
    BadValidation,
    BadFlash,
    BadVerification,
    BadSlot,
    Other(u8),
}

/// Firmware update status as polled with FIRMWARE_UPDATE_STATUS.
///
/// Codes below 0x80 are progress. Everything from 0x80 up is terminal: Idle
/// means no update is running and is neither success nor failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwUpdateState {
    Started,
    Downloading,
    VerifyingSignature,
    ValidatingImage,
    Flashing,
    VerifyingFlash,
    Idle,
    Success,
    Failed(FwUpdateFailure),
}

impl TryFrom<u8> for FwUpdateState {
    type Error = CucCodecError;

    fn try_from(status: u8) -> Result<Self, Self::Error> {
        let state = match status {
            0x00 => FwUpdateState::Started,
            0x01 => FwUpdateState::Downloading,
            0x02 => FwUpdateState::VerifyingSignature,
            0x03 => FwUpdateState::ValidatingImage,
            0x04 => FwUpdateState::Flashing,
            0x05 => FwUpdateState::VerifyingFlash,
            0x06..=0x7F => return Err(CucCodecError::UnknownStatus(status)),
            FWU_STATUS_IDLE => FwUpdateState::Idle,
            FWU_STATUS_SUCCESS => FwUpdateState::Success,
            0x82 => FwUpdateState::Failed(FwUpdateFailure::BadDownload),
            0x83 => FwUpdateState::Failed(FwUpdateFailure::BadSignature),
            0x84 => FwUpdateState::Failed(FwUpdateFailure::BadValidation),
            0x85 => FwUpdateState::Failed(FwUpdateFailure::BadFlash),
            0x86 => FwUpdateState::Failed(FwUpdateFailure::BadVerification),
            0x87 => FwUpdateState::Failed(FwUpdateFailure::BadSlot),
            other => FwUpdateState::Failed(FwUpdateFailure::Other(other)),
        };
        Ok(state)
    }
}

impl FwUpdateState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FwUpdateState::Idle | FwUpdateState::Success | FwUpdateState::Failed(_)
        )
    }

    pub fn is_success(&self) -> bool {
        *self == FwUpdateState::Success
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FwUpdateState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CucCodec;

    #[test]
    fn test_status_classification() {
        let started = FwUpdateState::try_from(0x00).unwrap();
        assert_eq!(started, FwUpdateState::Started);
        assert!(!started.is_terminal());

        let idle = FwUpdateState::try_from(0x80).unwrap();
        assert_eq!(idle, FwUpdateState::Idle);
        assert!(idle.is_terminal());
        assert!(!idle.is_success() && !idle.is_failure());

        let success = FwUpdateState::try_from(0x81).unwrap();
        assert!(success.is_terminal() && success.is_success());

        assert_eq!(
            FwUpdateState::try_from(0x83).unwrap(),
            FwUpdateState::Failed(FwUpdateFailure::BadSignature)
        );
        assert_eq!(
            FwUpdateState::try_from(0x87).unwrap(),
            FwUpdateState::Failed(FwUpdateFailure::BadSlot)
        );
        assert_eq!(
            FwUpdateState::try_from(0x90).unwrap(),
            FwUpdateState::Failed(FwUpdateFailure::Other(0x90))
        );
    }

    #[test]
    fn test_unknown_progress_status() {
        assert_eq!(
            FwUpdateState::try_from(0x06),
            Err(CucCodecError::UnknownStatus(0x06))
        );
        assert_eq!(
            FwUpdateState::try_from(0x7F),
            Err(CucCodecError::UnknownStatus(0x7F))
        );
    }

    #[test]
    fn test_update_start_layout() {
        let req = FirmwareUpdateStartRequest::new(1, 0x0001_0000, FwSlot::Recovery);
        let mut buffer = [0u8; 8];
        assert_eq!(req.encode(&mut buffer).unwrap(), 6);
        assert_eq!(&buffer[..6], &[1, 0x00, 0x00, 0x01, 0x00, 1]);
    }

    #[test]
    fn test_slot() {
        assert_eq!(FwSlot::try_from(1).unwrap(), FwSlot::Recovery);
        assert_eq!(FwSlot::try_from(2), Err(CucCodecError::InvalidArgument));
    }

    #[test]
    fn test_version_request() {
        let req = FirmwareVersionRequest::stored(FirmwareTarget::QspiBlob, 0, FwSlot::Recovery);
        let mut buffer = [0u8; 4];
        req.encode(&mut buffer).unwrap();
        assert_eq!(buffer, [2, 0, 1, 1]);
    }
}
