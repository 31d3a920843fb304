// Licensed under the Apache-2.0 license

use crate::codec::{PldmCodec, PldmCodecError};
use crate::error::PldmError;
use crate::protocol::base::{
    decode_response, InstanceId, PldmBaseCompletionCode, PldmMsgHeader, PldmMsgType,
    PldmSupportedType, PLDM_MSG_HEADER_LEN,
};
use crate::protocol::platform::{PlatformCmd, SensorDataSize, SensorOperationalState};
use crate::protocol::sensor_value::SensorReading;
use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U16};

#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct GetSensorReadingRequest {
    pub hdr: PldmMsgHeader<[u8; PLDM_MSG_HEADER_LEN]>,
    pub sensor_id: U16<LE>,
    pub rearm_event_state: u8,
}

impl GetSensorReadingRequest {
    pub fn new(instance_id: InstanceId, sensor_id: u16, rearm_event_state: bool) -> Self {
        GetSensorReadingRequest {
            hdr: PldmMsgHeader::new(
                instance_id,
                PldmMsgType::Request,
                PldmSupportedType::Platform,
                PlatformCmd::GetSensorReading as u8,
            ),
            sensor_id: U16::new(sensor_id),
            rearm_event_state: rearm_event_state as u8,
        }
    }
}

/// Everything in the response up to, but not including, `present_reading`.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct GetSensorReadingResponseFixed {
    pub hdr: PldmMsgHeader<[u8; PLDM_MSG_HEADER_LEN]>,
    pub completion_code: u8,
    pub sensor_data_size: u8,
    pub sensor_operational_state: u8,
    pub sensor_event_message_enable: u8,
    pub present_state: u8,
    pub previous_state: u8,
    pub event_state: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetSensorReadingResponse {
    pub fixed: GetSensorReadingResponseFixed,
    pub present_reading: SensorReading,
}

/// Event and operational state fields that accompany a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorStates {
    pub operational_state: u8,
    pub event_message_enable: u8,
    pub present_state: u8,
    pub previous_state: u8,
    pub event_state: u8,
}

impl Default for SensorStates {
    fn default() -> Self {
        SensorStates {
            operational_state: SensorOperationalState::Enabled as u8,
            event_message_enable: 0,
            present_state: 0,
            previous_state: 0,
            event_state: 0,
        }
    }
}

impl GetSensorReadingResponse {
    pub fn new(
        instance_id: InstanceId,
        completion_code: u8,
        states: SensorStates,
        present_reading: SensorReading,
    ) -> Self {
        GetSensorReadingResponse {
            fixed: GetSensorReadingResponseFixed {
                hdr: PldmMsgHeader::new(
                    instance_id,
                    PldmMsgType::Response,
                    PldmSupportedType::Platform,
                    PlatformCmd::GetSensorReading as u8,
                ),
                completion_code,
                sensor_data_size: present_reading.data_size() as u8,
                sensor_operational_state: states.operational_state,
                sensor_event_message_enable: states.event_message_enable,
                present_state: states.present_state,
                previous_state: states.previous_state,
                event_state: states.event_state,
            },
            present_reading,
        }
    }

    /// Decodes a full response message, checking the command echo and the
    /// completion code before the size tag is used to pick the reading width.
    pub fn parse(buffer: &[u8]) -> Result<Self, PldmError> {
        decode_response(buffer, PlatformCmd::GetSensorReading as u8)?;
        let (fixed, rest) = GetSensorReadingResponseFixed::read_from_prefix(buffer)
            .map_err(|_| PldmError::Codec(PldmCodecError::BufferTooShort))?;
        let size = SensorDataSize::try_from(fixed.sensor_data_size)?;
        let present_reading = SensorReading::decode(size, rest)?;
        Ok(GetSensorReadingResponse {
            fixed,
            present_reading,
        })
    }

    pub fn data_size(&self) -> SensorDataSize {
        self.present_reading.data_size()
    }

    pub fn operational_state(&self) -> Result<SensorOperationalState, PldmError> {
        SensorOperationalState::try_from(self.fixed.sensor_operational_state)
    }

    pub fn is_success(&self) -> bool {
        self.fixed.completion_code == PldmBaseCompletionCode::Success as u8
    }
}

impl PldmCodec for GetSensorReadingResponse {
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, PldmCodecError> {
        let fixed_len = self.fixed.encode(buffer)?;
        let reading_len = self.present_reading.encode(&mut buffer[fixed_len..])?;
        Ok(fixed_len + reading_len)
    }

    fn decode(buffer: &[u8]) -> Result<Self, PldmCodecError> {
        let (fixed, rest) = GetSensorReadingResponseFixed::read_from_prefix(buffer)
            .map_err(|_| PldmCodecError::BufferTooShort)?;
        let size =
            SensorDataSize::try_from(fixed.sensor_data_size).map_err(|_| PldmCodecError::Unsupported)?;
        Ok(GetSensorReadingResponse {
            fixed,
            present_reading: SensorReading::decode(size, rest)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_sensor_reading_request() {
        let request = GetSensorReadingRequest::new(0x02, 7, false);
        let mut buffer = [0u8; core::mem::size_of::<GetSensorReadingRequest>()];
        request.encode(&mut buffer).unwrap();
        assert_eq!(buffer, [0x82, 0x02, 0x11, 0x07, 0x00, 0x00]);

        let decoded_request = GetSensorReadingRequest::decode(&buffer).unwrap();
        assert_eq!(request, decoded_request);
    }

    #[test]
    fn test_get_sensor_reading_uint16() {
        let buffer = [
            0x02, 0x02, 0x11, // header
            0x00, // completion code
            SensorDataSize::UInt16 as u8,
            0x00, 0x01, 0x00, 0x00, 0x00, // states
            0x34, 0x12,
        ];
        let response = GetSensorReadingResponse::parse(&buffer).unwrap();
        assert_eq!(response.present_reading, SensorReading::U16(4660));
        assert_eq!(response.data_size(), SensorDataSize::UInt16);
        assert!(response.is_success());
        assert_eq!(
            response.operational_state().unwrap(),
            SensorOperationalState::Enabled
        );
    }

    #[test]
    fn test_get_sensor_reading_ignores_union_padding() {
        // The uC sends the whole four byte union even for narrow readings.
        let buffer = [
            0x02, 0x02, 0x11, 0x00, SensorDataSize::SInt8 as u8, 0x00, 0x00, 0x00, 0x00, 0x00,
            0xF6, 0xAA, 0xBB, 0xCC,
        ];
        let response = GetSensorReadingResponse::parse(&buffer).unwrap();
        assert_eq!(response.present_reading, SensorReading::I8(-10));
    }

    #[test]
    fn test_get_sensor_reading_rejects_bad_tag() {
        let buffer = [
            0x02, 0x02, 0x11, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04,
        ];
        assert_eq!(
            GetSensorReadingResponse::parse(&buffer),
            Err(PldmError::UnknownSensorSize(0x09))
        );
        assert_eq!(
            GetSensorReadingResponse::decode(&buffer),
            Err(PldmCodecError::Unsupported)
        );
    }

    #[test]
    fn test_get_sensor_reading_short_reading() {
        let buffer = [
            0x02, 0x02, 0x11, 0x00, SensorDataSize::UInt32 as u8, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x01, 0x02,
        ];
        assert_eq!(
            GetSensorReadingResponse::parse(&buffer),
            Err(PldmError::Codec(PldmCodecError::BufferTooShort))
        );
    }

    #[test]
    fn test_get_sensor_reading_error_completion() {
        let buffer = [0x02, 0x02, 0x11, 0x01];
        assert_eq!(
            GetSensorReadingResponse::parse(&buffer),
            Err(PldmError::BadCompletionCode(0x01))
        );
    }

    #[test]
    fn test_get_sensor_reading_response_encode() {
        let response = GetSensorReadingResponse::new(
            0x05,
            PldmBaseCompletionCode::Success as u8,
            SensorStates::default(),
            SensorReading::I32(-1),
        );
        let mut buffer = [0u8; 32];
        let len = response.encode(&mut buffer).unwrap();
        assert_eq!(len, 14);
        assert_eq!(buffer[4], SensorDataSize::SInt32 as u8);
        assert_eq!(&buffer[10..14], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(GetSensorReadingResponse::decode(&buffer[..len]).unwrap(), response);
    }
}
