// Licensed under the Apache-2.0 license

use core::fmt;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// `nic` value asking for the MAC of the NIC that sent the request.
pub const MAC_THIS_NIC: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable)]
#[repr(transparent)]
pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct MacRequest {
    pub nic: u8,
}

impl MacRequest {
    pub fn new(nic: u8) -> Self {
        MacRequest { nic }
    }

    pub fn this_nic() -> Self {
        MacRequest { nic: MAC_THIS_NIC }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct MacResponse {
    pub nic: u8,
    pub nic_mac: MacAddress,
    pub uc_mac: MacAddress,
}
