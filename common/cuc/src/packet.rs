// Licensed under the Apache-2.0 license

//! The `[cmd][count][type][data]` envelope.
//!
//! This layer only checks lengths. Integrity is left to the physical link,
//! and the command and type bytes are kept as received so that the caller
//! decides what an unexpected value means.

use crate::codec::{CucCodec, CucCodecError};
use crate::protocol::{
    CucCommand, CucPacketHeader, CucPacketType, ErrorResponse, CUC_MAX_PAYLOAD,
    CUC_PACKET_HEADER_LEN,
};
use core::convert::TryFrom;
use zerocopy::FromBytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CucPacket {
    cmd: u8,
    packet_type: u8,
    payload: Vec<u8>,
}

impl CucPacket {
    pub fn new(
        cmd: CucCommand,
        packet_type: CucPacketType,
        payload: &[u8],
    ) -> Result<Self, CucCodecError> {
        Self::from_raw(cmd as u8, packet_type as u8, payload)
    }

    /// Builds a packet from raw command and type bytes.
    pub fn from_raw(cmd: u8, packet_type: u8, payload: &[u8]) -> Result<Self, CucCodecError> {
        if payload.len() > CUC_MAX_PAYLOAD {
            return Err(CucCodecError::PayloadTooLarge);
        }
        Ok(CucPacket {
            cmd,
            packet_type,
            payload: payload.to_vec(),
        })
    }

    /// Builds a request whose payload is a single fixed-layout message.
    pub fn request<P: CucCodec>(cmd: CucCommand, message: &P) -> Result<Self, CucCodecError> {
        let mut payload = [0u8; CUC_MAX_PAYLOAD];
        let len = message
            .encode(&mut payload)
            .map_err(|_| CucCodecError::PayloadTooLarge)?;
        Self::new(cmd, CucPacketType::Request, &payload[..len])
    }

    pub fn raw_command(&self) -> u8 {
        self.cmd
    }

    pub fn command(&self) -> Result<CucCommand, CucCodecError> {
        CucCommand::try_from(self.cmd)
    }

    pub fn raw_packet_type(&self) -> u8 {
        self.packet_type
    }

    pub fn packet_type(&self) -> Result<CucPacketType, CucCodecError> {
        CucPacketType::try_from(self.packet_type)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// The `count` byte: type byte plus payload.
    pub fn count(&self) -> u8 {
        // Bounded by CUC_MAX_PAYLOAD at construction.
        (self.payload.len() + 1) as u8
    }

    pub fn encoded_len(&self) -> usize {
        CUC_PACKET_HEADER_LEN + self.payload.len()
    }

    /// The errno carried by a `ResponseError` packet.
    pub fn error_response(&self) -> Option<ErrorResponse> {
        if self.packet_type != CucPacketType::ResponseError as u8 {
            return None;
        }
        ErrorResponse::decode(&self.payload).ok()
    }

    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, CucCodecError> {
        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(CucCodecError::BufferTooShort);
        }
        let header = CucPacketHeader {
            cmd: self.cmd,
            count: self.count(),
            packet_type: self.packet_type,
        };
        header.encode(buffer)?;
        buffer[CUC_PACKET_HEADER_LEN..len].copy_from_slice(&self.payload);
        Ok(len)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.extend_from_slice(&[self.cmd, self.count(), self.packet_type]);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CucCodecError> {
        let (header, rest) =
            CucPacketHeader::read_from_prefix(bytes).map_err(|_| CucCodecError::Truncated)?;
        let count = header.count as usize;
        if count == 0 || count - 1 != rest.len() || rest.len() > CUC_MAX_PAYLOAD {
            return Err(CucCodecError::LengthMismatch);
        }
        Ok(CucPacket {
            cmd: header.cmd,
            packet_type: header.packet_type,
            payload: rest.to_vec(),
        })
    }
}

/// Encodes a packet in one step.
pub fn encode_packet(
    cmd: CucCommand,
    packet_type: CucPacketType,
    payload: &[u8],
) -> Result<Vec<u8>, CucCodecError> {
    Ok(CucPacket::new(cmd, packet_type, payload)?.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MacRequest;

    #[test]
    fn test_encode_layout() {
        let bytes = encode_packet(CucCommand::GetMac, CucPacketType::Request, &[0xFF]).unwrap();
        assert_eq!(bytes, vec![29, 0x02, 0x00, 0xFF]);

        let ping = encode_packet(CucCommand::Ping, CucPacketType::Request, &[]).unwrap();
        assert_eq!(ping, vec![0, 0x01, 0x00]);
    }

    #[test]
    fn test_payload_boundary() {
        let max = [0xA5u8; CUC_MAX_PAYLOAD];
        let bytes = encode_packet(CucCommand::QsfpWrite, CucPacketType::Request, &max).unwrap();
        assert_eq!(bytes.len(), 255);
        assert_eq!(bytes[1], 253);

        let over = [0xA5u8; CUC_MAX_PAYLOAD + 1];
        assert_eq!(
            encode_packet(CucCommand::QsfpWrite, CucPacketType::Request, &over),
            Err(CucCodecError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_round_trip() {
        let cases: [(CucCommand, CucPacketType, &[u8]); 4] = [
            (CucCommand::Ping, CucPacketType::Request, &[]),
            (CucCommand::Pldm, CucPacketType::ResponsePldm, &[0x01, 0x02, 0x51, 0x00]),
            (CucCommand::Reset, CucPacketType::ResponseError, &[22]),
            (CucCommand::QsfpRead, CucPacketType::ResponseSuccess, &[0x5A; CUC_MAX_PAYLOAD]),
        ];
        for (cmd, packet_type, payload) in cases {
            let packet = CucPacket::new(cmd, packet_type, payload).unwrap();
            let mut buffer = [0u8; 300];
            let len = packet.encode(&mut buffer).unwrap();
            assert_eq!(&buffer[..len], packet.to_bytes().as_slice());

            let decoded = CucPacket::decode(&buffer[..len]).unwrap();
            assert_eq!(decoded, packet);
            assert_eq!(decoded.command().unwrap(), cmd);
            assert_eq!(decoded.packet_type().unwrap(), packet_type);
            assert_eq!(decoded.payload(), payload);
        }
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(CucPacket::decode(&[]), Err(CucCodecError::Truncated));
        assert_eq!(CucPacket::decode(&[1, 1]), Err(CucCodecError::Truncated));
    }

    #[test]
    fn test_decode_length_mismatch() {
        // count claims two payload bytes, one present
        assert_eq!(
            CucPacket::decode(&[1, 3, 1, 0x00]),
            Err(CucCodecError::LengthMismatch)
        );
        // trailing byte not covered by count
        assert_eq!(
            CucPacket::decode(&[1, 1, 1, 0x00]),
            Err(CucCodecError::LengthMismatch)
        );
        assert_eq!(
            CucPacket::decode(&[1, 0, 1]),
            Err(CucCodecError::LengthMismatch)
        );

        let mut oversized = vec![31, 254, 1];
        oversized.extend_from_slice(&[0u8; 253]);
        assert_eq!(
            CucPacket::decode(&oversized),
            Err(CucCodecError::LengthMismatch)
        );
    }

    #[test]
    fn test_raw_bytes_kept() {
        let packet = CucPacket::decode(&[0x7E, 1, 0x09]).unwrap();
        assert_eq!(packet.raw_command(), 0x7E);
        assert_eq!(packet.command(), Err(CucCodecError::UnknownCommand(0x7E)));
        assert_eq!(
            packet.packet_type(),
            Err(CucCodecError::UnknownPacketType(0x09))
        );
    }

    #[test]
    fn test_error_response() {
        let packet = CucPacket::decode(&[54, 2, 2, 16]).unwrap();
        assert_eq!(packet.error_response(), Some(ErrorResponse { error: 16 }));

        let success = CucPacket::decode(&[54, 1, 1]).unwrap();
        assert_eq!(success.error_response(), None);
    }

    #[test]
    fn test_request_from_message() {
        let packet = CucPacket::request(CucCommand::GetMac, &MacRequest::this_nic()).unwrap();
        assert_eq!(packet.to_bytes(), vec![29, 2, 0, 0xFF]);
    }
}
