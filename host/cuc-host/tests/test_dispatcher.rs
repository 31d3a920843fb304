// Licensed under the Apache-2.0 license

use cuc_common::codec::CucCodecError;
use cuc_common::firmware_target::FirmwareTarget;
use cuc_common::message::{BoardType, Led, LedState, TimingEntry, ATT1_FAN_FAIL, ATT1_QSFP_INT};
use cuc_common::protocol::{CucCommand, CucPacketType};
use cuc_host::{CucHostError, Dispatcher, DispatcherConfig, TransportError};
use log::LevelFilter;
use mock_transport::MockTransport;
use pldm_cxi::error::PldmError;
use pldm_cxi::fru::FruFieldType;
use pldm_cxi::message::platform::{GetSensorReadingResponse, SensorStates};
use pldm_cxi::protocol::base::{PldmFailureResponse, PldmSupportedType};
use pldm_cxi::protocol::platform::{PlatformCmd, SensorDataSize};
use pldm_cxi::protocol::sensor_value::SensorReading;
use simple_logger::SimpleLogger;

fn setup() -> MockTransport {
    let _ = SimpleLogger::new().with_level(LevelFilter::Debug).init();
    MockTransport::new()
}

#[test]
fn test_ping() {
    let mut transport = setup();
    transport.push_success(CucCommand::Ping, &[]);
    let mut dispatcher = Dispatcher::new(transport);
    dispatcher.ping().unwrap();
    assert_eq!(dispatcher.transport().sent, vec![vec![0x00, 0x01, 0x00]]);
}

#[test]
fn test_board_info() {
    let mut transport = setup();
    transport.push_success(CucCommand::BoardInfo, &[0x05, 0x01]);
    let mut dispatcher = Dispatcher::new(transport);
    let info = dispatcher.board_info().unwrap();
    assert_eq!(info.board_type(), BoardType::Souhegan);
    assert_eq!(info.board_rev, 1);
}

#[test]
fn test_error_packet_maps_to_device_error() {
    let mut transport = setup();
    transport.push_device_error(CucCommand::GetFanRpm, 22);
    let mut dispatcher = Dispatcher::new(transport);
    assert_eq!(dispatcher.get_fan_rpm(), Err(CucHostError::DeviceError(22)));
}

#[test]
fn test_packet_type_validation() {
    let mut transport = setup();
    // PLDM answered as a plain success.
    transport.push_success(CucCommand::Pldm, &[0x00, 0x02, 0x11, 0x00]);
    // A plain command answered as PLDM.
    transport.push_packet(CucCommand::Ping, CucPacketType::ResponsePldm, &[]);
    // A request echoed back.
    transport.push_packet(CucCommand::Ping, CucPacketType::Request, &[]);
    let mut dispatcher = Dispatcher::new(transport);

    assert_eq!(
        dispatcher.get_sensor_reading(1, false),
        Err(CucHostError::UnexpectedPacketType {
            command: CucCommand::Pldm,
            actual: CucPacketType::ResponseSuccess as u8,
        })
    );
    assert_eq!(
        dispatcher.ping(),
        Err(CucHostError::UnexpectedPacketType {
            command: CucCommand::Ping,
            actual: CucPacketType::ResponsePldm as u8,
        })
    );
    assert_eq!(
        dispatcher.ping(),
        Err(CucHostError::UnexpectedPacketType {
            command: CucCommand::Ping,
            actual: CucPacketType::Request as u8,
        })
    );
}

#[test]
fn test_command_echo_mismatch() {
    let mut transport = setup();
    transport.push_success(CucCommand::BoardInfo, &[0x00, 0x00]);
    let mut dispatcher = Dispatcher::new(transport);
    assert_eq!(
        dispatcher.ping(),
        Err(CucHostError::CommandMismatch {
            expected: CucCommand::Ping,
            actual: CucCommand::BoardInfo as u8,
        })
    );
}

#[test]
fn test_malformed_envelope() {
    let mut transport = setup();
    transport.push_raw(&[0x00, 0x05, 0x01, 0xAA]);
    transport.push_raw(&[0x00, 0x01]);
    let mut dispatcher = Dispatcher::new(transport);
    assert_eq!(
        dispatcher.ping(),
        Err(CucHostError::MalformedEnvelope(CucCodecError::LengthMismatch))
    );
    assert_eq!(
        dispatcher.ping(),
        Err(CucHostError::MalformedEnvelope(CucCodecError::Truncated))
    );
}

#[test]
fn test_transport_failure() {
    let mut transport = setup();
    transport.push_error(TransportError::ConnectionLost);
    let mut dispatcher = Dispatcher::new(transport);
    let err = dispatcher.reset().unwrap_err();
    assert_eq!(err, CucHostError::Transport(TransportError::ConnectionLost));
    assert!(!err.is_retryable());
}

#[test]
fn test_get_sensor_reading_uint16() {
    let mut transport = setup();
    transport.push_pldm(&GetSensorReadingResponse::new(
        0,
        0x00,
        SensorStates::default(),
        SensorReading::U16(0x1234),
    ));
    let mut dispatcher = Dispatcher::new(transport);

    let response = dispatcher.get_sensor_reading(7, false).unwrap();
    assert_eq!(response.data_size(), SensorDataSize::UInt16);
    assert_eq!(response.present_reading, SensorReading::U16(4660));
    assert_eq!(response.present_reading.as_i64(), 4660);
    assert_eq!(
        dispatcher.transport().sent[0],
        vec![
            CucCommand::Pldm as u8,
            0x07, // count
            CucPacketType::Request as u8,
            0x80, 0x02, 0x11, // PLDM header, instance id 0
            0x07, 0x00, // sensor id
            0x00, // rearm
        ]
    );
    assert_eq!(dispatcher.instance_id(), 1);
}

#[test]
fn test_pldm_instance_mismatch() {
    let mut transport = setup();
    transport.push_pldm(&GetSensorReadingResponse::new(
        4,
        0x00,
        SensorStates::default(),
        SensorReading::U8(1),
    ));
    let mut dispatcher = Dispatcher::with_config(
        transport,
        DispatcherConfig {
            initial_instance_id: 3,
        },
    );
    assert_eq!(
        dispatcher.get_sensor_reading(1, false),
        Err(CucHostError::InstanceMismatch {
            expected: 3,
            actual: 4
        })
    );
}

#[test]
fn test_pldm_completion_error() {
    let mut transport = setup();
    transport.push_pldm(&PldmFailureResponse::new(
        0,
        PldmSupportedType::Platform,
        PlatformCmd::GetSensorReading as u8,
        0x04,
    ));
    let mut dispatcher = Dispatcher::new(transport);
    let err = dispatcher.get_sensor_reading(1, false).unwrap_err();
    assert_eq!(err, CucHostError::PldmCompletion(0x04));
    assert!(err.is_retryable());
}

#[test]
fn test_pldm_unknown_sensor_size() {
    let mut transport = setup();
    transport.push_packet(
        CucCommand::Pldm,
        CucPacketType::ResponsePldm,
        &[0x00, 0x02, 0x11, 0x00, 0x07, 0, 0, 0, 0, 0, 1, 2, 3, 4],
    );
    let mut dispatcher = Dispatcher::new(transport);
    assert_eq!(
        dispatcher.get_sensor_reading(1, false),
        Err(CucHostError::UnknownTag {
            kind: "sensor data size",
            value: 0x07
        })
    );
}

#[test]
fn test_raw_pldm_command_mismatch() {
    let mut transport = setup();
    transport.push_packet(
        CucCommand::Pldm,
        CucPacketType::ResponsePldm,
        &[0x00, 0x02, 0x51, 0x00],
    );
    let mut dispatcher = Dispatcher::new(transport);
    assert_eq!(
        dispatcher.pldm(PldmSupportedType::Platform, PlatformCmd::GetSensorReading as u8, &[1, 0, 0]),
        Err(CucHostError::Pldm(PldmError::CommandMismatch {
            expected: 0x11,
            actual: 0x51
        }))
    );
}

#[test]
fn test_get_log() {
    let mut transport = setup();
    transport.push_success(CucCommand::GetLog, b"fan ok\0");
    transport.push_success(CucCommand::GetLog, &[]);
    let mut dispatcher = Dispatcher::new(transport);
    assert_eq!(dispatcher.get_log().unwrap(), Some("fan ok".to_string()));
    assert_eq!(dispatcher.get_log().unwrap(), None);
}

#[test]
fn test_get_fru() {
    let mut transport = setup();
    transport.push_success(
        CucCommand::GetFru,
        &[
            0x01, 0x00, // record set id
            0x01, // general record
            0x01, // one field
            0x01, // ASCII
            0x04, 0x03, b'S', b'N', b'1', // serial number
        ],
    );
    let mut dispatcher = Dispatcher::new(transport);
    let records = dispatcher.get_fru().unwrap();
    assert_eq!(records.len(), 1);
    let serial = records[0].field(FruFieldType::SerialNumber).unwrap();
    assert_eq!(serial.value, b"SN1".to_vec());
}

#[test]
fn test_fan_pwm() {
    let mut transport = setup();
    transport.push_success(CucCommand::SetFanPwm, &[]);
    transport.push_success(CucCommand::SetFanPwm, &[]);
    let mut dispatcher = Dispatcher::new(transport);
    dispatcher.set_fan_pwm(40).unwrap();
    dispatcher.set_fan_pwm(255).unwrap();
    assert!(dispatcher.set_fan_pwm(101).is_err());
    let sent = &dispatcher.transport().sent;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0][3], 40);
    assert_eq!(sent[1][3], 255);
}

#[test]
fn test_qsfp_access() {
    let mut transport = setup();
    transport.push_success(CucCommand::QsfpRead, &[0x11, 0x22]);
    transport.push_success(CucCommand::QsfpRead, &[0x11]);
    transport.push_success(CucCommand::QsfpWrite, &[]);
    let mut dispatcher = Dispatcher::new(transport);

    assert_eq!(dispatcher.qsfp_read(0, 0, 0x80, 2).unwrap(), vec![0x11, 0x22]);
    assert_eq!(
        dispatcher.qsfp_read(0, 0, 0x80, 2),
        Err(CucHostError::MalformedEnvelope(CucCodecError::LengthMismatch))
    );
    dispatcher.qsfp_write(1, 3, 0x10, &[0xAB, 0xCD]).unwrap();
    assert_eq!(
        dispatcher.transport().sent[2],
        vec![CucCommand::QsfpWrite as u8, 7, 0, 1, 3, 0x10, 2, 0xAB, 0xCD]
    );

    // Rejected before anything is sent.
    assert!(dispatcher.qsfp_write(0, 0, 0, &[0u8; 249]).is_err());
    assert!(dispatcher.qsfp_read(0, 0, 0, 0).is_err());
    assert_eq!(dispatcher.transport().sent.len(), 3);
}

#[test]
fn test_interrupts() {
    let mut transport = setup();
    let mut payload = Vec::new();
    payload.extend_from_slice(&(ATT1_FAN_FAIL | ATT1_QSFP_INT).to_le_bytes());
    payload.extend_from_slice(&ATT1_FAN_FAIL.to_le_bytes());
    transport.push_success(CucCommand::GetIntr, &payload);
    transport.push_success(CucCommand::ClearIsr, &[]);
    let mut dispatcher = Dispatcher::new(transport);

    let intr = dispatcher.get_interrupts(0).unwrap();
    assert!(intr.pending().fan_fail());
    assert!(!intr.pending().qsfp_int());

    dispatcher.clear_isr(0, ATT1_FAN_FAIL | ATT1_QSFP_INT).unwrap();
    let sent = &dispatcher.transport().sent[1];
    assert_eq!(&sent[4..8], &ATT1_FAN_FAIL.to_le_bytes());
}

#[test]
fn test_firmware_version() {
    let mut transport = setup();
    transport.push_success(CucCommand::FirmwareVersion, b"1.5.2\0\0");
    let mut dispatcher = Dispatcher::new(transport);
    let version = dispatcher
        .firmware_version(FirmwareTarget::UcApplication, 0, None)
        .unwrap();
    assert_eq!(version, "1.5.2");
    assert_eq!(
        dispatcher.transport().sent[0],
        vec![CucCommand::FirmwareVersion as u8, 5, 0, 0, 0, 0, 0]
    );
}

#[test]
fn test_misc_commands() {
    let mut transport = setup();
    transport.push_success(CucCommand::GetNicId, &[1]);
    transport.push_success(CucCommand::SetLed, &[]);
    let mut timings = Vec::new();
    for i in 0..16u64 {
        timings.extend_from_slice(&(i * 1000).to_le_bytes());
    }
    transport.push_success(CucCommand::GetTimings, &timings);
    let mut mac = vec![0xFF];
    mac.extend_from_slice(&[0x02, 0, 0, 0xAA, 0xBB, 0xCC, 0x02, 0, 0, 0xAA, 0xBB, 0xCD]);
    transport.push_success(CucCommand::GetMac, &mac);
    let mut dispatcher = Dispatcher::new(transport);

    assert_eq!(dispatcher.get_nic_id().unwrap(), 1);
    dispatcher.set_led(1, Led::LinkStatus, LedState::SlowYellow).unwrap();
    assert_eq!(
        dispatcher.transport().sent[1],
        vec![CucCommand::SetLed as u8, 4, 0, 1, 0, 5]
    );
    let timings = dispatcher.get_timings().unwrap();
    assert_eq!(timings.entry_us(TimingEntry::Uptime), 15_000);
    let mac = dispatcher.get_mac(0xFF).unwrap();
    assert_eq!(mac.uc_mac.to_string(), "02:00:00:aa:bb:cd");
}
