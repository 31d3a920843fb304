// Licensed under the Apache-2.0 license

use zerocopy::{FromBytes, Immutable, IntoBytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Led {
    LinkStatus = 0,
    OcpLinkStatus = 1,
    OcpActivityStatus = 2,
}

/// Blink pattern of an LED. Green is the nominal color and yellow the
/// alternate; slow blinking is 1Hz and fast 2Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedState {
    Off = 0,
    OnGreen = 1,
    SlowGreen = 2,
    FastGreen = 3,
    OnYellow = 4,
    SlowYellow = 5,
    FastYellow = 6,
    SlowGreenYellow = 7,
    FastGreenYellow = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct SetLedRequest {
    pub nic: u8,
    pub led: u8,
    pub state: u8,
}

impl SetLedRequest {
    pub fn new(nic: u8, led: Led, state: LedState) -> Self {
        SetLedRequest {
            nic,
            led: led as u8,
            state: state as u8,
        }
    }
}
