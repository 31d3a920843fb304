// Licensed under the Apache-2.0 license

use crate::transport::TransportError;
use cuc_common::codec::CucCodecError;
use cuc_common::protocol::CucCommand;
use pldm_cxi::codec::PldmCodecError;
use pldm_cxi::error::PldmError;
use pldm_cxi::protocol::base::PldmBaseCompletionCode;
use thiserror::Error;

/// Everything that can go wrong talking to the uC.
///
/// Nothing is retried internally. `is_retryable` tells the caller which
/// failures may succeed on a second attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CucHostError {
    #[error("malformed packet envelope: {0:?}")]
    MalformedEnvelope(CucCodecError),

    #[error("unexpected packet type {actual:#04x} in response to {command:?}")]
    UnexpectedPacketType { command: CucCommand, actual: u8 },

    #[error("response echoes command {actual:#04x}, expected {expected:?}")]
    CommandMismatch { expected: CucCommand, actual: u8 },

    #[error("PLDM instance id {actual} does not match request instance id {expected}")]
    InstanceMismatch { expected: u8, actual: u8 },

    #[error("PLDM protocol error: {0:?}")]
    Pldm(PldmError),

    #[error("device reported errno {0}")]
    DeviceError(u8),

    #[error("PLDM completion code {0:#04x}")]
    PldmCompletion(u8),

    #[error("unknown {kind} {value:#04x}")]
    UnknownTag { kind: &'static str, value: u8 },

    #[error("transfer aborted: {0}")]
    TransferAborted(&'static str),

    /// The session has no result to hand out in its current state.
    #[error("result not available")]
    NotAvailable,

    /// The PDR repository changed while record `record_handle` was being read.
    #[error("PDR repository changed while reading record {record_handle:#x}")]
    RecordChanged {
        record_handle: u32,
        completion_code: Option<u8>,
    },

    #[error("firmware update already finished")]
    SessionFinished,

    #[error("invalid firmware slot {0}")]
    InvalidSlot(u8),

    /// The firmware update session is not in a phase that allows the call.
    #[error("not valid in this update phase: {0}")]
    InvalidPhase(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl CucHostError {
    pub fn is_retryable(&self) -> bool {
        match self {
            CucHostError::RecordChanged { .. } => true,
            CucHostError::PldmCompletion(code) => {
                *code == PldmBaseCompletionCode::NotReady as u8
            }
            CucHostError::Transport(err) => *err == TransportError::Timeout,
            _ => false,
        }
    }
}

impl From<CucCodecError> for CucHostError {
    fn from(err: CucCodecError) -> Self {
        match err {
            CucCodecError::UnknownStatus(value) => CucHostError::UnknownTag {
                kind: "firmware update status",
                value,
            },
            CucCodecError::UnknownBoardType(value) => CucHostError::UnknownTag {
                kind: "board type",
                value,
            },
            CucCodecError::InvalidArgument => {
                CucHostError::InvalidArgument("request field out of range")
            }
            other => CucHostError::MalformedEnvelope(other),
        }
    }
}

impl From<PldmError> for CucHostError {
    fn from(err: PldmError) -> Self {
        match err {
            PldmError::BadCompletionCode(code) => CucHostError::PldmCompletion(code),
            PldmError::UnknownSensorSize(value) => CucHostError::UnknownTag {
                kind: "sensor data size",
                value,
            },
            PldmError::UnknownPdrType(value) => CucHostError::UnknownTag {
                kind: "PDR type",
                value,
            },
            other => CucHostError::Pldm(other),
        }
    }
}

impl From<PldmCodecError> for CucHostError {
    fn from(err: PldmCodecError) -> Self {
        CucHostError::Pldm(PldmError::Codec(err))
    }
}
