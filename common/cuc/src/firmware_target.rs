// Licensed under the Apache-2.0 license

//! Firmware components and which of them a board's flash blob carries.
//!
//! The blob layout depends on the board generation, so the mapping is a
//! table looked up by the board type reported by the device. The built-in
//! table can be replaced with one loaded from TOML.

use crate::codec::CucCodecError;
use crate::message::BoardType;
use core::convert::TryFrom;
use serde::{Deserialize, Serialize};

/// Separately versioned components of the firmware blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum FirmwareTarget {
    UcApplication = 0,
    UcBootloader = 1,
    QspiBlob = 2,
    Oprom = 3,
    Csr1 = 4,
    Csr2 = 5,
    Srds = 6,
    Isl68124Saw = 7,
    Isl68124Brz = 8,
    Ir38060QsfpBrz = 9,
    Tda38740Was = 10,
    Ir38060Was = 11,
    Ir38063Was = 12,
    Tda38740Ken = 13,
    Ir38060Ken = 14,
    Ir38063Ken = 15,
    /// Formerly the Kennebec QSFP regulator; no longer populated.
    Reserved = 16,
    MfpgaWas = 17,
    Tda38740Sou = 18,
    #[serde(rename = "IR38063_0_SOU")]
    Ir38063Sou0 = 19,
    #[serde(rename = "IR38063_1_SOU")]
    Ir38063Sou1 = 20,
    #[serde(rename = "IR38063_2_SOU")]
    Ir38063Sou2 = 21,
    MfpgaSou = 22,
}

pub const FW_NUM_ENTRIES: u8 = 23;

impl TryFrom<u8> for FirmwareTarget {
    type Error = CucCodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use FirmwareTarget::*;
        const ALL: [FirmwareTarget; FW_NUM_ENTRIES as usize] = [
            UcApplication,
            UcBootloader,
            QspiBlob,
            Oprom,
            Csr1,
            Csr2,
            Srds,
            Isl68124Saw,
            Isl68124Brz,
            Ir38060QsfpBrz,
            Tda38740Was,
            Ir38060Was,
            Ir38063Was,
            Tda38740Ken,
            Ir38060Ken,
            Ir38063Ken,
            Reserved,
            MfpgaWas,
            Tda38740Sou,
            Ir38063Sou0,
            Ir38063Sou1,
            Ir38063Sou2,
            MfpgaSou,
        ];
        ALL.get(value as usize)
            .copied()
            .ok_or(CucCodecError::InvalidArgument)
    }
}

/// Cassini board generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub name: String,
    /// Raw BOARD_INFO board types belonging to this generation.
    pub boards: Vec<u8>,
    /// Components present in this generation's blob, in reporting order.
    pub targets: Vec<FirmwareTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTable {
    pub generations: Vec<Generation>,
}

impl Default for TargetTable {
    fn default() -> Self {
        use FirmwareTarget::*;
        let common = [UcApplication, UcBootloader, QspiBlob, Oprom, Csr1, Csr2, Srds];
        let cas1 = Generation {
            name: "cas1".into(),
            boards: vec![BoardType::Sawtooth.into(), BoardType::Brazos.into()],
            targets: common
                .iter()
                .copied()
                .chain([Isl68124Saw, Isl68124Brz, Ir38060QsfpBrz])
                .collect(),
        };
        let cas2 = Generation {
            name: "cas2".into(),
            boards: vec![
                BoardType::Washington.into(),
                BoardType::Kennebec.into(),
                BoardType::Pangani.into(),
                BoardType::Souhegan.into(),
            ],
            targets: common
                .iter()
                .copied()
                .chain([
                    Tda38740Was,
                    Ir38060Was,
                    Ir38063Was,
                    Tda38740Ken,
                    Ir38060Ken,
                    Ir38063Ken,
                    MfpgaWas,
                    Tda38740Sou,
                    Ir38063Sou0,
                    Ir38063Sou1,
                    Ir38063Sou2,
                    MfpgaSou,
                ])
                .collect(),
        };
        TargetTable {
            generations: vec![cas1, cas2],
        }
    }
}

impl TargetTable {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn generation(&self, board_type: BoardType) -> Option<&Generation> {
        let raw = u8::from(board_type);
        self.generations.iter().find(|g| g.boards.contains(&raw))
    }

    /// Components to enumerate on a board of `board_type`.
    pub fn targets_for(&self, board_type: BoardType) -> Result<&[FirmwareTarget], CucCodecError> {
        self.generation(board_type)
            .map(|g| g.targets.as_slice())
            .ok_or(CucCodecError::UnknownBoardType(u8::from(board_type)))
    }
}
