// Licensed under the Apache-2.0 license

//! Numeric Sensor PDR (DSP0248 Table 78).
//!
//! Everything from `hysteresis` to `fatal_low` changes width with the PDR's
//! own `sensor_data_size`, so the record is decoded as a fixed prefix followed
//! by one of three tail shapes.

use crate::codec::{PldmCodec, PldmCodecError};
use crate::error::PldmError;
use crate::protocol::platform::{
    PldmThreshold, SensorDataSize, SensorUnit, UnitModifier,
};
use crate::protocol::sensor_value::SensorReading;
use zerocopy::{FromBytes, Immutable, IntoBytes, F32, LE, U16, U32};

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct NumericSensorPdrFixed {
    pub terminus_handle: U16<LE>,
    pub sensor_id: U16<LE>,
    pub entity_type: U16<LE>,
    pub entity_instance_number: U16<LE>,
    pub container_id: U16<LE>,
    pub sensor_init: u8,
    pub sensor_auxiliary_names_pdr: u8,
    pub base_unit: u8,
    pub unit_modifier: i8,
    pub rate_unit: u8,
    pub base_oem_unit_handle: u8,
    pub aux_unit: u8,
    pub aux_unit_modifier: i8,
    pub aux_rate_unit: u8,
    pub rel: u8,
    pub aux_oem_unit_handle: u8,
    pub is_linear: u8,
    pub sensor_data_size: u8,
    pub resolution: F32<LE>,
    pub offset: F32<LE>,
    pub accuracy: U16<LE>,
    pub plus_tolerance: u8,
    pub minus_tolerance: u8,
}

impl NumericSensorPdrFixed {
    const ENTITY_LOGICAL_BIT: u16 = 0x8000;

    pub fn entity_id(&self) -> u16 {
        self.entity_type.get() & !Self::ENTITY_LOGICAL_BIT
    }

    pub fn is_logical_entity(&self) -> bool {
        self.entity_type.get() & Self::ENTITY_LOGICAL_BIT != 0
    }
}

macro_rules! numeric_sensor_tail {
    ($name:ident, $ty:ty) => {
        #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
        #[repr(C, packed)]
        pub struct $name {
            pub hysteresis: $ty,
            pub supported_thresholds: u8,
            pub threshold_and_hysteresis_volatility: u8,
            pub state_transition_interval: F32<LE>,
            pub update_interval: F32<LE>,
            pub max_readable: $ty,
            pub min_readable: $ty,
            pub range_field_format: u8,
            pub range_field_support: u8,
            pub nominal_value: $ty,
            pub normal_max: $ty,
            pub normal_min: $ty,
            pub warning_high: $ty,
            pub warning_low: $ty,
            pub critical_high: $ty,
            pub critical_low: $ty,
            pub fatal_high: $ty,
            pub fatal_low: $ty,
        }

        impl $name {
            fn raw_limits(&self) -> RawLimits {
                RawLimits {
                    hysteresis: RawField::raw(&{ self.hysteresis }),
                    supported_thresholds: self.supported_thresholds,
                    volatility: self.threshold_and_hysteresis_volatility,
                    state_transition_interval: self.state_transition_interval.get(),
                    update_interval: self.update_interval.get(),
                    max_readable: RawField::raw(&{ self.max_readable }),
                    min_readable: RawField::raw(&{ self.min_readable }),
                    range_field_format: self.range_field_format,
                    range_field_support: self.range_field_support,
                    nominal_value: RawField::raw(&{ self.nominal_value }),
                    normal_max: RawField::raw(&{ self.normal_max }),
                    normal_min: RawField::raw(&{ self.normal_min }),
                    warning_high: RawField::raw(&{ self.warning_high }),
                    warning_low: RawField::raw(&{ self.warning_low }),
                    critical_high: RawField::raw(&{ self.critical_high }),
                    critical_low: RawField::raw(&{ self.critical_low }),
                    fatal_high: RawField::raw(&{ self.fatal_high }),
                    fatal_low: RawField::raw(&{ self.fatal_low }),
                }
            }
        }
    };
}

trait RawField {
    fn raw(&self) -> u32;
}

impl RawField for u8 {
    fn raw(&self) -> u32 {
        *self as u32
    }
}

impl RawField for U16<LE> {
    fn raw(&self) -> u32 {
        self.get() as u32
    }
}

impl RawField for U32<LE> {
    fn raw(&self) -> u32 {
        self.get()
    }
}

numeric_sensor_tail!(NumericSensorSsd8, u8);
numeric_sensor_tail!(NumericSensorSsd16, U16<LE>);
numeric_sensor_tail!(NumericSensorSsd32, U32<LE>);

/// The size dependent tail of a Numeric Sensor PDR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericSensorTail {
    Ssd8(NumericSensorSsd8),
    Ssd16(NumericSensorSsd16),
    Ssd32(NumericSensorSsd32),
}

impl NumericSensorTail {
    /// Picks the tail shape for `size` and decodes it from the start of `buffer`.
    pub fn decode(size: SensorDataSize, buffer: &[u8]) -> Result<Self, PldmCodecError> {
        let tail = match size.width() {
            1 => NumericSensorTail::Ssd8(NumericSensorSsd8::decode(buffer)?),
            2 => NumericSensorTail::Ssd16(NumericSensorSsd16::decode(buffer)?),
            _ => NumericSensorTail::Ssd32(NumericSensorSsd32::decode(buffer)?),
        };
        Ok(tail)
    }

    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError> {
        match self {
            NumericSensorTail::Ssd8(tail) => tail.encode(buffer),
            NumericSensorTail::Ssd16(tail) => tail.encode(buffer),
            NumericSensorTail::Ssd32(tail) => tail.encode(buffer),
        }
    }

    /// Width in bytes of the value fields of this shape.
    pub fn width(&self) -> usize {
        match self {
            NumericSensorTail::Ssd8(_) => 1,
            NumericSensorTail::Ssd16(_) => 2,
            NumericSensorTail::Ssd32(_) => 4,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            NumericSensorTail::Ssd8(_) => core::mem::size_of::<NumericSensorSsd8>(),
            NumericSensorTail::Ssd16(_) => core::mem::size_of::<NumericSensorSsd16>(),
            NumericSensorTail::Ssd32(_) => core::mem::size_of::<NumericSensorSsd32>(),
        }
    }

    fn raw_limits(&self) -> RawLimits {
        match self {
            NumericSensorTail::Ssd8(tail) => tail.raw_limits(),
            NumericSensorTail::Ssd16(tail) => tail.raw_limits(),
            NumericSensorTail::Ssd32(tail) => tail.raw_limits(),
        }
    }
}

struct RawLimits {
    hysteresis: u32,
    supported_thresholds: u8,
    volatility: u8,
    state_transition_interval: f32,
    update_interval: f32,
    max_readable: u32,
    min_readable: u32,
    range_field_format: u8,
    range_field_support: u8,
    nominal_value: u32,
    normal_max: u32,
    normal_min: u32,
    warning_high: u32,
    warning_low: u32,
    critical_high: u32,
    critical_low: u32,
    fatal_high: u32,
    fatal_low: u32,
}

/// Tail fields of any shape, each value typed with the PDR's data size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSensorLimits {
    pub hysteresis: SensorReading,
    pub supported_thresholds: u8,
    pub threshold_and_hysteresis_volatility: u8,
    pub state_transition_interval: f32,
    pub update_interval: f32,
    pub max_readable: SensorReading,
    pub min_readable: SensorReading,
    pub range_field_format: u8,
    pub range_field_support: u8,
    pub nominal_value: SensorReading,
    pub normal_max: SensorReading,
    pub normal_min: SensorReading,
    pub warning_high: SensorReading,
    pub warning_low: SensorReading,
    pub critical_high: SensorReading,
    pub critical_low: SensorReading,
    pub fatal_high: SensorReading,
    pub fatal_low: SensorReading,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSensorPdr {
    fixed: NumericSensorPdrFixed,
    tail: NumericSensorTail,
    size: SensorDataSize,
}

impl NumericSensorPdr {
    /// Builds a record whose `sensor_data_size` agrees with `tail`.
    ///
    /// Fails with `UnknownSensorSize` when the declared size selects a
    /// different tail shape.
    pub fn new(mut fixed: NumericSensorPdrFixed, tail: NumericSensorTail) -> Result<Self, PldmError> {
        let size = SensorDataSize::try_from(fixed.sensor_data_size)?;
        if size.width() != tail.width() {
            return Err(PldmError::UnknownSensorSize(fixed.sensor_data_size));
        }
        fixed.sensor_data_size = size as u8;
        Ok(NumericSensorPdr { fixed, tail, size })
    }

    /// Decodes the record body that follows the common PDR header.
    pub fn parse(data: &[u8]) -> Result<Self, PldmError> {
        let (fixed, rest) = NumericSensorPdrFixed::read_from_prefix(data)
            .map_err(|_| PldmError::Codec(PldmCodecError::BufferTooShort))?;
        let size = SensorDataSize::try_from(fixed.sensor_data_size)?;
        let tail = NumericSensorTail::decode(size, rest)?;
        Ok(NumericSensorPdr { fixed, tail, size })
    }

    pub fn sensor_id(&self) -> u16 {
        self.fixed.sensor_id.get()
    }

    pub fn fixed(&self) -> &NumericSensorPdrFixed {
        &self.fixed
    }

    pub fn tail(&self) -> &NumericSensorTail {
        &self.tail
    }

    pub fn data_size(&self) -> SensorDataSize {
        self.size
    }

    pub fn base_unit(&self) -> SensorUnit {
        SensorUnit::from(self.fixed.base_unit)
    }

    pub fn unit_modifier(&self) -> UnitModifier {
        UnitModifier(self.fixed.unit_modifier)
    }

    pub fn limits(&self) -> NumericSensorLimits {
        let size = self.data_size();
        let raw = self.tail.raw_limits();
        let typed = |value: u32| SensorReading::from_raw(size, value);
        NumericSensorLimits {
            hysteresis: typed(raw.hysteresis),
            supported_thresholds: raw.supported_thresholds,
            threshold_and_hysteresis_volatility: raw.volatility,
            state_transition_interval: raw.state_transition_interval,
            update_interval: raw.update_interval,
            max_readable: typed(raw.max_readable),
            min_readable: typed(raw.min_readable),
            range_field_format: raw.range_field_format,
            range_field_support: raw.range_field_support,
            nominal_value: typed(raw.nominal_value),
            normal_max: typed(raw.normal_max),
            normal_min: typed(raw.normal_min),
            warning_high: typed(raw.warning_high),
            warning_low: typed(raw.warning_low),
            critical_high: typed(raw.critical_high),
            critical_low: typed(raw.critical_low),
            fatal_high: typed(raw.fatal_high),
            fatal_low: typed(raw.fatal_low),
        }
    }

    pub fn supports_threshold(&self, threshold: PldmThreshold) -> bool {
        self.limits().supported_thresholds & threshold.mask() != 0
    }

    /// The value of `threshold`, if the sensor declares it supported.
    pub fn threshold(&self, threshold: PldmThreshold) -> Option<SensorReading> {
        if !self.supports_threshold(threshold) {
            return None;
        }
        let limits = self.limits();
        Some(match threshold {
            PldmThreshold::UpperWarning => limits.warning_high,
            PldmThreshold::UpperCritical => limits.critical_high,
            PldmThreshold::UpperFatal => limits.fatal_high,
            PldmThreshold::LowerWarning => limits.warning_low,
            PldmThreshold::LowerCritical => limits.critical_low,
            PldmThreshold::LowerFatal => limits.fatal_low,
        })
    }

    /// Converts a raw reading into the sensor's base unit:
    /// `(resolution * raw + offset) * 10^unit_modifier`.
    pub fn convert(&self, reading: &SensorReading) -> f64 {
        let resolution = self.fixed.resolution.get() as f64;
        let offset = self.fixed.offset.get() as f64;
        (resolution * reading.as_i64() as f64 + offset) * self.unit_modifier().scale()
    }
}

impl PldmCodec for NumericSensorPdr {
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError> {
        let fixed_len = self.fixed.encode(buffer)?;
        let tail_len = self.tail.encode(&mut buffer[fixed_len..])?;
        Ok(fixed_len + tail_len)
    }

    fn decode(buffer: &[u8]) -> Result<Self, PldmCodecError> {
        NumericSensorPdr::parse(buffer).map_err(|err| match err {
            PldmError::Codec(err) => err,
            _ => PldmCodecError::Unsupported,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fixed(sensor_id: u16, size: SensorDataSize) -> NumericSensorPdrFixed {
        NumericSensorPdrFixed {
            terminus_handle: U16::new(1),
            sensor_id: U16::new(sensor_id),
            entity_type: U16::new(0x8000 | 135),
            entity_instance_number: U16::new(1),
            container_id: U16::new(0),
            sensor_init: 0,
            sensor_auxiliary_names_pdr: 1,
            base_unit: 2,
            unit_modifier: -3,
            rate_unit: 0,
            base_oem_unit_handle: 0,
            aux_unit: 0,
            aux_unit_modifier: 0,
            aux_rate_unit: 0,
            rel: 0,
            aux_oem_unit_handle: 0,
            is_linear: 1,
            sensor_data_size: size as u8,
            resolution: F32::new(1.0),
            offset: F32::new(0.0),
            accuracy: U16::new(0),
            plus_tolerance: 0,
            minus_tolerance: 0,
        }
    }

    pub(crate) fn ssd16() -> NumericSensorSsd16 {
        NumericSensorSsd16 {
            hysteresis: U16::new(2),
            supported_thresholds: PldmThreshold::UpperWarning.mask()
                | PldmThreshold::UpperCritical.mask()
                | PldmThreshold::LowerWarning.mask(),
            threshold_and_hysteresis_volatility: 0,
            state_transition_interval: F32::new(0.0),
            update_interval: F32::new(1.0),
            max_readable: U16::new(12_500),
            min_readable: U16::new(0xFFFF),
            range_field_format: SensorDataSize::SInt16 as u8,
            range_field_support: 0,
            nominal_value: U16::new(4_000),
            normal_max: U16::new(8_500),
            normal_min: U16::new(0),
            warning_high: U16::new(9_500),
            warning_low: U16::new(0xFFF6),
            critical_high: U16::new(10_500),
            critical_low: U16::new(0),
            fatal_high: U16::new(0),
            fatal_low: U16::new(0),
        }
    }

    fn ssd8() -> NumericSensorSsd8 {
        NumericSensorSsd8 {
            hysteresis: 1,
            supported_thresholds: PldmThreshold::LowerFatal.mask(),
            threshold_and_hysteresis_volatility: 0,
            state_transition_interval: F32::new(0.0),
            update_interval: F32::new(0.5),
            max_readable: 0x7F,
            min_readable: 0x80,
            range_field_format: SensorDataSize::SInt8 as u8,
            range_field_support: 0,
            nominal_value: 25,
            normal_max: 80,
            normal_min: 0xF6,
            warning_high: 90,
            warning_low: 0xF1,
            critical_high: 100,
            critical_low: 0xEC,
            fatal_high: 110,
            fatal_low: 0xE2,
        }
    }

    #[test]
    fn test_shape_sizes() {
        assert_eq!(core::mem::size_of::<NumericSensorPdrFixed>(), 35);
        assert_eq!(core::mem::size_of::<NumericSensorSsd8>(), 24);
        assert_eq!(core::mem::size_of::<NumericSensorSsd16>(), 36);
        assert_eq!(core::mem::size_of::<NumericSensorSsd32>(), 60);
    }

    #[test]
    fn test_numeric_sensor_pdr_16bit() {
        let pdr = NumericSensorPdr::new(
            fixed(7, SensorDataSize::UInt16),
            NumericSensorTail::Ssd16(ssd16()),
        )
        .unwrap();
        let mut buffer = [0u8; 128];
        let len = pdr.encode(&mut buffer).unwrap();
        assert_eq!(len, 35 + 36);

        let parsed = NumericSensorPdr::parse(&buffer[..len]).unwrap();
        assert_eq!(parsed, pdr);
        assert_eq!(parsed.sensor_id(), 7);
        assert_eq!(parsed.fixed.entity_id(), 135);
        assert!(parsed.fixed.is_logical_entity());
        assert_eq!(parsed.base_unit(), SensorUnit::DegreesC);
        assert_eq!(parsed.unit_modifier(), UnitModifier::MILLI);

        let limits = parsed.limits();
        assert_eq!(limits.warning_high, SensorReading::U16(9_500));
        assert_eq!(limits.min_readable, SensorReading::U16(0xFFFF));
        assert_eq!(
            parsed.threshold(PldmThreshold::UpperWarning),
            Some(SensorReading::U16(9_500))
        );
        assert_eq!(parsed.threshold(PldmThreshold::UpperFatal), None);
    }

    #[test]
    fn test_numeric_sensor_pdr_signed_8bit() {
        let pdr = NumericSensorPdr::new(
            fixed(3, SensorDataSize::SInt8),
            NumericSensorTail::Ssd8(ssd8()),
        )
        .unwrap();
        let mut buffer = [0u8; 128];
        let len = pdr.encode(&mut buffer).unwrap();
        assert_eq!(len, 35 + 24);

        let parsed = NumericSensorPdr::parse(&buffer[..len]).unwrap();
        let limits = parsed.limits();
        assert_eq!(limits.min_readable, SensorReading::I8(-128));
        assert_eq!(limits.warning_low, SensorReading::I8(-15));
        assert_eq!(
            parsed.threshold(PldmThreshold::LowerFatal),
            Some(SensorReading::I8(-30))
        );
    }

    #[test]
    fn test_tail_shape_follows_data_size() {
        // A 16-bit tail does not fit the 32-bit shape the record claims.
        let mut record = fixed(9, SensorDataSize::UInt16);
        let mut buffer = [0u8; 128];
        let len = NumericSensorPdr::new(record, NumericSensorTail::Ssd16(ssd16()))
            .unwrap()
            .encode(&mut buffer)
            .unwrap();
        record.sensor_data_size = SensorDataSize::SInt32 as u8;
        record.encode(&mut buffer).unwrap();
        assert_eq!(
            NumericSensorPdr::parse(&buffer[..len]),
            Err(PldmError::Codec(PldmCodecError::BufferTooShort))
        );

        record.sensor_data_size = 0x0A;
        record.encode(&mut buffer).unwrap();
        assert_eq!(
            NumericSensorPdr::parse(&buffer[..len]),
            Err(PldmError::UnknownSensorSize(0x0A))
        );
    }

    #[test]
    fn test_mismatched_tail_rejected() {
        assert_eq!(
            NumericSensorPdr::new(
                fixed(1, SensorDataSize::UInt32),
                NumericSensorTail::Ssd16(ssd16())
            ),
            Err(PldmError::UnknownSensorSize(SensorDataSize::UInt32 as u8))
        );
    }

    #[test]
    fn test_data_size_matches_record() {
        let pdr = NumericSensorPdr::new(
            fixed(4, SensorDataSize::SInt16),
            NumericSensorTail::Ssd16(ssd16()),
        )
        .unwrap();
        assert_eq!(pdr.data_size(), SensorDataSize::SInt16);
        assert_eq!(pdr.fixed().sensor_data_size, SensorDataSize::SInt16 as u8);
        assert_eq!(pdr.tail().width(), 2);

        let mut buffer = [0u8; 128];
        let len = pdr.encode(&mut buffer).unwrap();
        let parsed = NumericSensorPdr::parse(&buffer[..len]).unwrap();
        assert_eq!(parsed.data_size(), SensorDataSize::SInt16);
        assert_eq!(parsed, pdr);
    }

    #[test]
    fn test_convert_reading() {
        let mut record = fixed(7, SensorDataSize::UInt16);
        record.resolution = F32::new(0.5);
        record.offset = F32::new(10.0);
        record.unit_modifier = 0;
        let pdr = NumericSensorPdr::new(record, NumericSensorTail::Ssd16(ssd16())).unwrap();
        assert_eq!(pdr.convert(&SensorReading::U16(100)), 60.0);
    }
}
