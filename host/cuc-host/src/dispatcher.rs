// Licensed under the Apache-2.0 license

//! Sends uC commands over a [`CucTransport`] and validates what comes back.
//!
//! Every exchange is one request packet and one response packet. The
//! dispatcher checks the envelope, the echoed command and the packet type
//! before a payload is handed to the typed decoders in `cuc-common` and
//! `pldm-cxi`.

use crate::error::CucHostError;
use crate::transport::CucTransport;
use cuc_common::codec::{CucCodec, CucCodecError};
use cuc_common::firmware_target::FirmwareTarget;
use cuc_common::message::{
    decode_text, BoardInfoResponse, ClearIsrRequest, FirmwareUpdateStartRequest,
    FirmwareUpdateStatusResponse, FirmwareVersionRequest, FwSlot, GetFanRpmResponse,
    GetIntrRequest, GetIntrResponse, Led, LedState, MacRequest, MacResponse, NicIdResponse,
    QsfpReadRequest, QsfpResetRequest, QsfpWriteRequest, SetFanPwmRequest, SetLedRequest,
    TimingsResponse, UpdateIerRequest, FAN_PWM_AUTO,
};
use cuc_common::packet::CucPacket;
use cuc_common::protocol::{CucCommand, CucPacketType};
use log::{debug, warn};
use pldm_cxi::error::PldmError;
use pldm_cxi::fru::{parse_fru_record_table, FruRecord};
use pldm_cxi::message::platform::{
    GetPdrRequest, GetPdrResponse, GetSensorReadingRequest, GetSensorReadingResponse,
};
use pldm_cxi::protocol::base::{
    decode_response, encode_request, InstanceId, PldmMsgHeader, PldmSupportedType,
    TransferOperationFlag, PLDM_INSTANCE_ID_MAX, PLDM_MSG_HEADER_LEN,
};
use zerocopy::{FromBytes, IntoBytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatcherConfig {
    /// First PLDM instance id handed out. Only the low five bits are used.
    pub initial_instance_id: InstanceId,
}

pub struct Dispatcher<T: CucTransport> {
    transport: T,
    instance_id: InstanceId,
}

impl<T: CucTransport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DispatcherConfig::default())
    }

    pub fn with_config(transport: T, config: DispatcherConfig) -> Self {
        Dispatcher {
            transport,
            instance_id: config.initial_instance_id & PLDM_INSTANCE_ID_MAX,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Instance id the next PLDM request will carry.
    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    fn next_instance_id(&mut self) -> InstanceId {
        let id = self.instance_id;
        self.instance_id = (self.instance_id + 1) & PLDM_INSTANCE_ID_MAX;
        id
    }

    /// Runs one command and returns the response payload.
    pub fn execute(&mut self, cmd: CucCommand, payload: &[u8]) -> Result<Vec<u8>, CucHostError> {
        let request = CucPacket::new(cmd, CucPacketType::Request, payload)?;
        self.exchange(cmd, request)
    }

    /// Runs a command whose request payload is a single message.
    pub fn execute_message<P: CucCodec>(
        &mut self,
        cmd: CucCommand,
        message: &P,
    ) -> Result<Vec<u8>, CucHostError> {
        let request = CucPacket::request(cmd, message)?;
        self.exchange(cmd, request)
    }

    fn exchange(&mut self, cmd: CucCommand, request: CucPacket) -> Result<Vec<u8>, CucHostError> {
        let bytes = request.to_bytes();
        debug!("uC tx {:?}: {:02x?}", cmd, bytes);
        let response = self.transport.transmit(&bytes)?;
        debug!("uC rx {:?}: {:02x?}", cmd, response);

        let packet = CucPacket::decode(&response).map_err(CucHostError::MalformedEnvelope)?;
        if packet.raw_command() != cmd as u8 {
            return Err(CucHostError::CommandMismatch {
                expected: cmd,
                actual: packet.raw_command(),
            });
        }

        let packet_type = packet.raw_packet_type();
        if packet_type == CucPacketType::ResponseError as u8 {
            let errno = packet
                .error_response()
                .map(|rsp| rsp.error)
                .ok_or(CucHostError::MalformedEnvelope(CucCodecError::BufferTooShort))?;
            warn!("uC rejected {:?} with errno {}", cmd, errno);
            return Err(CucHostError::DeviceError(errno));
        }
        if packet_type != cmd.success_response_type() as u8 {
            return Err(CucHostError::UnexpectedPacketType {
                command: cmd,
                actual: packet_type,
            });
        }
        Ok(packet.into_payload())
    }

    fn decode_payload<R: CucCodec>(payload: &[u8]) -> Result<R, CucHostError> {
        R::decode(payload).map_err(CucHostError::MalformedEnvelope)
    }

    /// Sends a PLDM request built from `pldm_type`, `command` and `body`.
    ///
    /// Returns the whole response message, header and completion code
    /// included, once it is known to answer this request successfully.
    pub fn pldm(
        &mut self,
        pldm_type: PldmSupportedType,
        command: u8,
        body: &[u8],
    ) -> Result<Vec<u8>, CucHostError> {
        let instance_id = self.next_instance_id();
        let request = encode_request(pldm_type, command, instance_id, body);
        self.pldm_message(&request)
    }

    fn pldm_message(&mut self, request: &[u8]) -> Result<Vec<u8>, CucHostError> {
        let (request_hdr, _) = PldmMsgHeader::<[u8; PLDM_MSG_HEADER_LEN]>::read_from_prefix(request)
            .map_err(|_| CucHostError::Pldm(PldmError::ShortHeader))?;
        let response = self.execute(CucCommand::Pldm, request)?;

        let (response_hdr, _) =
            PldmMsgHeader::<[u8; PLDM_MSG_HEADER_LEN]>::read_from_prefix(&response)
                .map_err(|_| CucHostError::Pldm(PldmError::ShortHeader))?;
        if response_hdr.instance_id() != request_hdr.instance_id() {
            return Err(CucHostError::InstanceMismatch {
                expected: request_hdr.instance_id(),
                actual: response_hdr.instance_id(),
            });
        }
        if response_hdr.pldm_type() != request_hdr.pldm_type() {
            return Err(CucHostError::Pldm(PldmError::UnsupportedPldmType));
        }
        decode_response(&response, request_hdr.cmd_code())?;
        Ok(response)
    }

    pub fn ping(&mut self) -> Result<(), CucHostError> {
        self.execute(CucCommand::Ping, &[]).map(|_| ())
    }

    pub fn board_info(&mut self) -> Result<BoardInfoResponse, CucHostError> {
        let payload = self.execute(CucCommand::BoardInfo, &[])?;
        Self::decode_payload(&payload)
    }

    /// Fetches the next queued log message, or `None` once the log is drained.
    pub fn get_log(&mut self) -> Result<Option<String>, CucHostError> {
        let payload = self.execute(CucCommand::GetLog, &[])?;
        if payload.is_empty() {
            return Ok(None);
        }
        Ok(Some(decode_text(&payload)))
    }

    pub fn get_fru(&mut self) -> Result<Vec<FruRecord>, CucHostError> {
        let payload = self.execute(CucCommand::GetFru, &[])?;
        Ok(parse_fru_record_table(&payload)?)
    }

    /// Sets the fan duty cycle in percent, or hands control back to the uC
    /// with [`FAN_PWM_AUTO`].
    pub fn set_fan_pwm(&mut self, percent: u8) -> Result<(), CucHostError> {
        let request = if percent == FAN_PWM_AUTO {
            SetFanPwmRequest::auto()
        } else {
            SetFanPwmRequest::manual(percent)
                .map_err(|_| CucHostError::InvalidArgument("fan duty cycle above 100%"))?
        };
        self.execute_message(CucCommand::SetFanPwm, &request)
            .map(|_| ())
    }

    pub fn get_fan_rpm(&mut self) -> Result<GetFanRpmResponse, CucHostError> {
        let payload = self.execute(CucCommand::GetFanRpm, &[])?;
        Self::decode_payload(&payload)
    }

    pub fn get_mac(&mut self, nic: u8) -> Result<MacResponse, CucHostError> {
        let payload = self.execute_message(CucCommand::GetMac, &MacRequest::new(nic))?;
        Self::decode_payload(&payload)
    }

    pub fn qsfp_read(
        &mut self,
        nic: u8,
        page: u8,
        addr: u8,
        count: u8,
    ) -> Result<Vec<u8>, CucHostError> {
        let request = QsfpReadRequest::new(nic, page, addr, count)
            .map_err(|_| CucHostError::InvalidArgument("QSFP read count out of range"))?;
        let payload = self.execute_message(CucCommand::QsfpRead, &request)?;
        if payload.len() != count as usize {
            return Err(CucHostError::MalformedEnvelope(CucCodecError::LengthMismatch));
        }
        Ok(payload)
    }

    pub fn qsfp_write(
        &mut self,
        nic: u8,
        page: u8,
        addr: u8,
        data: &[u8],
    ) -> Result<(), CucHostError> {
        let request = QsfpWriteRequest::new(nic, page, addr, data)
            .map_err(|_| CucHostError::InvalidArgument("QSFP write does not fit one packet"))?;
        self.execute_message(CucCommand::QsfpWrite, &request)
            .map(|_| ())
    }

    pub fn qsfp_reset(&mut self, nic: u8) -> Result<(), CucHostError> {
        self.execute_message(CucCommand::QsfpReset, &QsfpResetRequest { nic })
            .map(|_| ())
    }

    pub fn get_interrupts(&mut self, nic: u8) -> Result<GetIntrResponse, CucHostError> {
        let payload = self.execute_message(CucCommand::GetIntr, &GetIntrRequest { nic })?;
        Self::decode_payload(&payload)
    }

    /// Clears ISR bits. Bits the uC owns are dropped from the request.
    pub fn clear_isr(&mut self, nic: u8, bits: u32) -> Result<(), CucHostError> {
        self.execute_message(CucCommand::ClearIsr, &ClearIsrRequest::new(nic, bits))
            .map(|_| ())
    }

    pub fn update_ier(&mut self, nic: u8, set_bits: u32, clear_bits: u32) -> Result<(), CucHostError> {
        let request = UpdateIerRequest::new(nic, set_bits, clear_bits);
        self.execute_message(CucCommand::UpdateIer, &request)
            .map(|_| ())
    }

    /// Reads the version of `target`: the running image, or the copy stored
    /// in `slot` when one is given.
    pub fn firmware_version(
        &mut self,
        target: FirmwareTarget,
        nic: u8,
        slot: Option<FwSlot>,
    ) -> Result<String, CucHostError> {
        let request = match slot {
            Some(slot) => FirmwareVersionRequest::stored(target, nic, slot),
            None => FirmwareVersionRequest::running(target, nic),
        };
        let payload = self.execute_message(CucCommand::FirmwareVersion, &request)?;
        Ok(decode_text(&payload))
    }

    pub fn firmware_update_start(
        &mut self,
        nic: u8,
        size: u32,
        slot: FwSlot,
    ) -> Result<(), CucHostError> {
        let request = FirmwareUpdateStartRequest::new(nic, size, slot);
        self.execute_message(CucCommand::FirmwareUpdateStart, &request)
            .map(|_| ())
    }

    pub fn firmware_update_download(&mut self, chunk: &[u8]) -> Result<(), CucHostError> {
        self.execute(CucCommand::FirmwareUpdateDownload, chunk)
            .map(|_| ())
    }

    pub fn firmware_update_status(
        &mut self,
    ) -> Result<FirmwareUpdateStatusResponse, CucHostError> {
        let payload = self.execute(CucCommand::FirmwareUpdateStatus, &[])?;
        Self::decode_payload(&payload)
    }

    pub fn reset(&mut self) -> Result<(), CucHostError> {
        self.execute(CucCommand::Reset, &[]).map(|_| ())
    }

    pub fn set_led(&mut self, nic: u8, led: Led, state: LedState) -> Result<(), CucHostError> {
        self.execute_message(CucCommand::SetLed, &SetLedRequest::new(nic, led, state))
            .map(|_| ())
    }

    pub fn get_nic_id(&mut self) -> Result<u8, CucHostError> {
        let payload = self.execute(CucCommand::GetNicId, &[])?;
        Self::decode_payload::<NicIdResponse>(&payload).map(|rsp| rsp.nic)
    }

    pub fn get_timings(&mut self) -> Result<TimingsResponse, CucHostError> {
        let payload = self.execute(CucCommand::GetTimings, &[])?;
        Self::decode_payload(&payload)
    }

    pub fn get_sensor_reading(
        &mut self,
        sensor_id: u16,
        rearm_event_state: bool,
    ) -> Result<GetSensorReadingResponse, CucHostError> {
        let request =
            GetSensorReadingRequest::new(self.next_instance_id(), sensor_id, rearm_event_state);
        let response = self.pldm_message(request.as_bytes())?;
        Ok(GetSensorReadingResponse::parse(&response)?)
    }

    pub fn get_pdr(
        &mut self,
        record_handle: u32,
        data_transfer_handle: u32,
        transfer_operation_flag: TransferOperationFlag,
        request_count: u16,
        record_change_number: u16,
    ) -> Result<GetPdrResponse, CucHostError> {
        let request = GetPdrRequest::new(
            self.next_instance_id(),
            record_handle,
            data_transfer_handle,
            transfer_operation_flag,
            request_count,
            record_change_number,
        );
        let response = self.pldm_message(request.as_bytes())?;
        Ok(GetPdrResponse::parse(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use std::collections::VecDeque;

    struct Scripted {
        responses: VecDeque<Vec<u8>>,
        sent: Vec<Vec<u8>>,
    }

    impl CucTransport for Scripted {
        fn transmit(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
            self.sent.push(request.to_vec());
            self.responses.pop_front().ok_or(TransportError::Timeout)
        }
    }

    fn dispatcher(responses: &[&[u8]]) -> Dispatcher<Scripted> {
        Dispatcher::new(Scripted {
            responses: responses.iter().map(|r| r.to_vec()).collect(),
            sent: Vec::new(),
        })
    }

    #[test]
    fn test_instance_id_wraps() {
        let mut dispatcher = Dispatcher::with_config(
            Scripted {
                responses: VecDeque::new(),
                sent: Vec::new(),
            },
            DispatcherConfig {
                initial_instance_id: 0x1F,
            },
        );
        assert_eq!(dispatcher.next_instance_id(), 0x1F);
        assert_eq!(dispatcher.next_instance_id(), 0x00);
        assert_eq!(dispatcher.instance_id(), 0x01);
    }

    #[test]
    fn test_ping_frames_request() {
        let mut dispatcher = dispatcher(&[&[0x00, 0x01, 0x01]]);
        dispatcher.ping().unwrap();
        assert_eq!(dispatcher.transport().sent, vec![vec![0x00, 0x01, 0x00]]);
    }

    #[test]
    fn test_transport_error_passes_through() {
        let mut dispatcher = dispatcher(&[]);
        assert_eq!(
            dispatcher.ping(),
            Err(CucHostError::Transport(TransportError::Timeout))
        );
    }

    #[test]
    fn test_fan_pwm_rejected_locally() {
        let mut dispatcher = dispatcher(&[]);
        assert!(matches!(
            dispatcher.set_fan_pwm(101),
            Err(CucHostError::InvalidArgument(_))
        ));
        assert!(dispatcher.transport().sent.is_empty());
    }
}
