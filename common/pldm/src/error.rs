// Licensed under the Apache-2.0 license

use crate::codec::PldmCodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PldmError {
    /// Fewer bytes than a PLDM header plus completion code.
    ShortHeader,
    /// The rq bit was set on a message decoded as a response.
    NotAResponse,
    /// The response answers a different command than the one requested.
    CommandMismatch { expected: u8, actual: u8 },
    /// The responder reported a non-success completion code.
    BadCompletionCode(u8),
    UnsupportedPldmType,
    UnsupportedCmd,
    InvalidMsgType,
    InvalidCompletionCode,
    InvalidTransferOpFlag,
    InvalidTransferRespFlag,
    UnknownSensorSize(u8),
    UnknownPdrType(u8),
    InvalidSensorOpState,
    InvalidFruRecordType(u8),
    /// A length field points past the end of the available data.
    InvalidLength,
    Codec(PldmCodecError),
}

impl From<PldmCodecError> for PldmError {
    fn from(err: PldmCodecError) -> Self {
        PldmError::Codec(err)
    }
}
