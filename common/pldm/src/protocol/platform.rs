// Licensed under the Apache-2.0 license

//! Platform Monitoring and Control (DSP0248) codes used by the uC.

use crate::error::PldmError;
use core::convert::TryFrom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlatformCmd {
    GetSensorReading = 0x11,
    GetPdr = 0x51,
}

impl TryFrom<u8> for PlatformCmd {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0x11 => Ok(PlatformCmd::GetSensorReading),
            0x51 => Ok(PlatformCmd::GetPdr),
            _ => Err(PldmError::UnsupportedCmd),
        }
    }
}

/// sensorDataSize values (DSP0248 Table 78). Selects the width and
/// signedness of readings and of the numeric sensor PDR tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorDataSize {
    UInt8 = 0,
    SInt8 = 1,
    UInt16 = 2,
    SInt16 = 3,
    UInt32 = 4,
    SInt32 = 5,
}

impl SensorDataSize {
    /// Width in bytes of a value of this size.
    pub fn width(&self) -> usize {
        match self {
            SensorDataSize::UInt8 | SensorDataSize::SInt8 => 1,
            SensorDataSize::UInt16 | SensorDataSize::SInt16 => 2,
            SensorDataSize::UInt32 | SensorDataSize::SInt32 => 4,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            SensorDataSize::SInt8 | SensorDataSize::SInt16 | SensorDataSize::SInt32
        )
    }
}

impl TryFrom<u8> for SensorDataSize {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0 => Ok(SensorDataSize::UInt8),
            1 => Ok(SensorDataSize::SInt8),
            2 => Ok(SensorDataSize::UInt16),
            3 => Ok(SensorDataSize::SInt16),
            4 => Ok(SensorDataSize::UInt32),
            5 => Ok(SensorDataSize::SInt32),
            _ => Err(PldmError::UnknownSensorSize(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorOperationalState {
    Enabled = 0,
    Disabled = 1,
    Unavailable = 2,
    StatusUnknown = 3,
    Failed = 4,
    Initializing = 5,
    ShuttingDown = 6,
    InTest = 7,
}

impl TryFrom<u8> for SensorOperationalState {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0 => Ok(SensorOperationalState::Enabled),
            1 => Ok(SensorOperationalState::Disabled),
            2 => Ok(SensorOperationalState::Unavailable),
            3 => Ok(SensorOperationalState::StatusUnknown),
            4 => Ok(SensorOperationalState::Failed),
            5 => Ok(SensorOperationalState::Initializing),
            6 => Ok(SensorOperationalState::ShuttingDown),
            7 => Ok(SensorOperationalState::InTest),
            _ => Err(PldmError::InvalidSensorOpState),
        }
    }
}

/// Base units reported by the uC (DSP0248 Table 62). Anything else is kept
/// as its raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorUnit {
    None,
    DegreesC,
    Volts,
    Amps,
    Watts,
    Other(u8),
}

impl From<u8> for SensorUnit {
    fn from(value: u8) -> Self {
        match value {
            0 => SensorUnit::None,
            2 => SensorUnit::DegreesC,
            5 => SensorUnit::Volts,
            6 => SensorUnit::Amps,
            7 => SensorUnit::Watts,
            other => SensorUnit::Other(other),
        }
    }
}

impl SensorUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            SensorUnit::None | SensorUnit::Other(_) => "",
            SensorUnit::DegreesC => "C",
            SensorUnit::Volts => "V",
            SensorUnit::Amps => "A",
            SensorUnit::Watts => "W",
        }
    }
}

/// Power-of-ten unit modifier. The uC only uses the named values but the
/// field is a plain signed exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitModifier(pub i8);

impl UnitModifier {
    pub const NANO: UnitModifier = UnitModifier(-9);
    pub const MICRO: UnitModifier = UnitModifier(-6);
    pub const MILLI: UnitModifier = UnitModifier(-3);
    pub const CENTI: UnitModifier = UnitModifier(-2);
    pub const DECI: UnitModifier = UnitModifier(-1);
    pub const NONE: UnitModifier = UnitModifier(0);
    pub const KILO: UnitModifier = UnitModifier(3);

    pub fn scale(&self) -> f64 {
        10f64.powi(self.0 as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PldmThreshold {
    UpperWarning = 0,
    UpperCritical = 1,
    UpperFatal = 2,
    LowerWarning = 3,
    LowerCritical = 4,
    LowerFatal = 5,
}

impl PldmThreshold {
    pub const ALL: [PldmThreshold; 6] = [
        PldmThreshold::UpperWarning,
        PldmThreshold::UpperCritical,
        PldmThreshold::UpperFatal,
        PldmThreshold::LowerWarning,
        PldmThreshold::LowerCritical,
        PldmThreshold::LowerFatal,
    ];

    /// Bit of this threshold in `supported_thresholds`.
    pub fn mask(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// PDR type values (DSP0248 Table 76).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PdrType {
    TerminusLocator = 1,
    NumericSensor = 2,
    StateSensor = 4,
    SensorAuxiliaryNames = 6,
    StateEffecter = 11,
    EffecterAuxiliaryNames = 13,
    EntityAssociation = 15,
    EntityAuxiliaryNames = 16,
    FruRecordSet = 20,
    Oem = 127,
}

impl TryFrom<u8> for PdrType {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            1 => Ok(PdrType::TerminusLocator),
            2 => Ok(PdrType::NumericSensor),
            4 => Ok(PdrType::StateSensor),
            6 => Ok(PdrType::SensorAuxiliaryNames),
            11 => Ok(PdrType::StateEffecter),
            13 => Ok(PdrType::EffecterAuxiliaryNames),
            15 => Ok(PdrType::EntityAssociation),
            16 => Ok(PdrType::EntityAuxiliaryNames),
            20 => Ok(PdrType::FruRecordSet),
            127 => Ok(PdrType::Oem),
            _ => Err(PldmError::UnknownPdrType(value)),
        }
    }
}

/// GetPDR command specific completion codes (DSP0248 Table 68).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GetPdrCompletionCode {
    InvalidDataTransferHandle = 0x80,
    InvalidTransferOperationFlag = 0x81,
    InvalidRecordHandle = 0x82,
    InvalidRecordChangeNumber = 0x83,
    TransferTimeout = 0x84,
    RepositoryUpdateInProgress = 0x85,
}

impl TryFrom<u8> for GetPdrCompletionCode {
    type Error = PldmError;

    fn try_from(value: u8) -> Result<Self, PldmError> {
        match value {
            0x80 => Ok(GetPdrCompletionCode::InvalidDataTransferHandle),
            0x81 => Ok(GetPdrCompletionCode::InvalidTransferOperationFlag),
            0x82 => Ok(GetPdrCompletionCode::InvalidRecordHandle),
            0x83 => Ok(GetPdrCompletionCode::InvalidRecordChangeNumber),
            0x84 => Ok(GetPdrCompletionCode::TransferTimeout),
            0x85 => Ok(GetPdrCompletionCode::RepositoryUpdateInProgress),
            _ => Err(PldmError::InvalidCompletionCode),
        }
    }
}

impl GetPdrCompletionCode {
    /// The repository changed underneath the transfer.
    pub fn is_repository_changed(&self) -> bool {
        matches!(
            self,
            GetPdrCompletionCode::InvalidRecordChangeNumber
                | GetPdrCompletionCode::RepositoryUpdateInProgress
        )
    }
}
