// Licensed under the Apache-2.0 license

//! Board identification (BOARD_INFO, GET_NIC_ID).

use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Board types reported by BOARD_INFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardType {
    Sawtooth,
    Brazos,
    Washington,
    Kennebec,
    Pangani,
    Souhegan,
    Unknown(u8),
}

impl From<u8> for BoardType {
    fn from(value: u8) -> Self {
        match value {
            0 => BoardType::Sawtooth,
            1 => BoardType::Brazos,
            2 => BoardType::Washington,
            3 => BoardType::Kennebec,
            4 => BoardType::Pangani,
            5 => BoardType::Souhegan,
            other => BoardType::Unknown(other),
        }
    }
}

impl From<BoardType> for u8 {
    fn from(board: BoardType) -> Self {
        match board {
            BoardType::Sawtooth => 0,
            BoardType::Brazos => 1,
            BoardType::Washington => 2,
            BoardType::Kennebec => 3,
            BoardType::Pangani => 4,
            BoardType::Souhegan => 5,
            BoardType::Unknown(value) => value,
        }
    }
}

/// Raw value the uC reports when it does not know its board.
pub const BOARD_TYPE_UNKNOWN: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct BoardInfoResponse {
    pub board_type: u8,
    pub board_rev: u8,
}

impl BoardInfoResponse {
    pub fn board_type(&self) -> BoardType {
        BoardType::from(self.board_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct NicIdResponse {
    /// NIC index behind the interface the request arrived on.
    pub nic: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CucCodec;

    #[test]
    fn test_board_info_response() {
        let rsp = BoardInfoResponse::decode(&[0x03, 0x02]).unwrap();
        assert_eq!(rsp.board_type(), BoardType::Kennebec);
        assert_eq!(rsp.board_rev, 2);

        let unknown = BoardInfoResponse::decode(&[BOARD_TYPE_UNKNOWN, 0]).unwrap();
        assert_eq!(unknown.board_type(), BoardType::Unknown(0xFF));
        assert_eq!(u8::from(unknown.board_type()), 0xFF);
    }
}
