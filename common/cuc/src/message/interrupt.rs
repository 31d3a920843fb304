// Licensed under the Apache-2.0 license

//! Interrupt sources behind UC_ATTENTION[1] (GET_INTR, CLEAR_ISR, UPDATE_IER).

use bitfield::bitfield;
use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U32};

pub const ATT1_UC_RESET: u32 = 1 << 0;
pub const ATT1_SENSOR_ALERT: u32 = 1 << 1;
pub const ATT1_FAN_FAIL: u32 = 1 << 2;
pub const ATT1_ASIC_PWR_UP_DONE: u32 = 1 << 8;
pub const ATT1_ASIC_PWR_FAIL: u32 = 1 << 9;
pub const ATT1_ASIC_EPO_TEMPERATURE: u32 = 1 << 10;
pub const ATT1_QSFP_POWER_FAIL: u32 = 1 << 16;
pub const ATT1_QSFP_INSERT: u32 = 1 << 17;
pub const ATT1_QSFP_REMOVE: u32 = 1 << 18;
pub const ATT1_QSFP_INT: u32 = 1 << 19;
pub const ATT1_QSFP_EPO_TEMPERATURE: u32 = 1 << 20;
pub const ATT1_QSFP_BAD_CABLE: u32 = 1 << 21;
pub const ATT1_ALL_INTERRUPTS: u32 = 0xFFFF_FFFF;

/// QSFP_INT follows the module's interrupt line and clears itself.
pub const HOST_CLEARED_ATT1_INTERRUPTS: u32 = ATT1_ALL_INTERRUPTS & !ATT1_QSFP_INT;

bitfield! {
    /// ISR/IER view of the ATT1 interrupt sources.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Att1Interrupts(u32);
    impl Debug;
    pub uc_reset, set_uc_reset: 0;
    pub sensor_alert, set_sensor_alert: 1;
    pub fan_fail, set_fan_fail: 2;
    pub asic_pwr_up_done, set_asic_pwr_up_done: 8;
    pub asic_pwr_fail, set_asic_pwr_fail: 9;
    pub asic_epo_temperature, set_asic_epo_temperature: 10;
    pub qsfp_power_fail, set_qsfp_power_fail: 16;
    pub qsfp_insert, set_qsfp_insert: 17;
    pub qsfp_remove, set_qsfp_remove: 18;
    pub qsfp_int, set_qsfp_int: 19;
    pub qsfp_epo_temperature, set_qsfp_epo_temperature: 20;
    pub qsfp_bad_cable, set_qsfp_bad_cable: 21;
}

impl Att1Interrupts {
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// The subset the host is allowed to clear.
    pub fn host_clearable(&self) -> Self {
        Att1Interrupts(self.0 & HOST_CLEARED_ATT1_INTERRUPTS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct GetIntrRequest {
    pub nic: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct GetIntrResponse {
    pub isr: U32<LE>,
    pub ier: U32<LE>,
}

impl GetIntrResponse {
    pub fn isr(&self) -> Att1Interrupts {
        Att1Interrupts(self.isr.get())
    }

    pub fn ier(&self) -> Att1Interrupts {
        Att1Interrupts(self.ier.get())
    }

    /// Sources that are both pending and enabled.
    pub fn pending(&self) -> Att1Interrupts {
        Att1Interrupts(self.isr.get() & self.ier.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct ClearIsrRequest {
    pub nic: u8,
    pub isr_clear_bits: U32<LE>,
}

impl ClearIsrRequest {
    /// Bits the host cannot clear are dropped from `bits`.
    pub fn new(nic: u8, bits: u32) -> Self {
        ClearIsrRequest {
            nic,
            isr_clear_bits: U32::new(bits & HOST_CLEARED_ATT1_INTERRUPTS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct UpdateIerRequest {
    pub nic: u8,
    pub ier_set_bits: U32<LE>,
    pub ier_clear_bits: U32<LE>,
}

impl UpdateIerRequest {
    pub fn new(nic: u8, set_bits: u32, clear_bits: u32) -> Self {
        UpdateIerRequest {
            nic,
            ier_set_bits: U32::new(set_bits),
            ier_clear_bits: U32::new(clear_bits),
        }
    }
}
