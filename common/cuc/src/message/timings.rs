// Licensed under the Apache-2.0 license

use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U64};

pub const TIMING_NUM_ENTRIES: usize = 16;

/// Power-on and initialization milestones reported by GET_TIMINGS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimingEntry {
    UcApplicationStarted = 0,
    UcPinInitComplete = 1,
    UcFwInitComplete = 2,
    EnClksUcAsserted = 3,
    Pg12V = 4,
    PgCassiniAsserted = 5,
    RstPonNicNDeasserted = 6,
    VidStableAsserted = 7,
    PerstNic0NDeasserted = 8,
    PerstNic1NDeasserted = 9,
    JtagTrstNDeasserted = 10,
    UcCassiniRdyNic0 = 11,
    UcCassiniRdyNic1 = 12,
    PcieLinkUpNic0 = 13,
    PcieLinkUpNic1 = 14,
    Uptime = 15,
}

impl TimingEntry {
    pub const ALL: [TimingEntry; TIMING_NUM_ENTRIES] = [
        TimingEntry::UcApplicationStarted,
        TimingEntry::UcPinInitComplete,
        TimingEntry::UcFwInitComplete,
        TimingEntry::EnClksUcAsserted,
        TimingEntry::Pg12V,
        TimingEntry::PgCassiniAsserted,
        TimingEntry::RstPonNicNDeasserted,
        TimingEntry::VidStableAsserted,
        TimingEntry::PerstNic0NDeasserted,
        TimingEntry::PerstNic1NDeasserted,
        TimingEntry::JtagTrstNDeasserted,
        TimingEntry::UcCassiniRdyNic0,
        TimingEntry::UcCassiniRdyNic1,
        TimingEntry::PcieLinkUpNic0,
        TimingEntry::PcieLinkUpNic1,
        TimingEntry::Uptime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimingEntry::UcApplicationStarted => "uc_application_started",
            TimingEntry::UcPinInitComplete => "uc_pin_init_complete",
            TimingEntry::UcFwInitComplete => "uc_fw_init_complete",
            TimingEntry::EnClksUcAsserted => "en_clks_uc_asserted",
            TimingEntry::Pg12V => "12v_pg",
            TimingEntry::PgCassiniAsserted => "pg_cassini_asserted",
            TimingEntry::RstPonNicNDeasserted => "rst_pon_nic_n_deasserted",
            TimingEntry::VidStableAsserted => "vid_stable_asserted",
            TimingEntry::PerstNic0NDeasserted => "perst_nic_0_n_deasserted",
            TimingEntry::PerstNic1NDeasserted => "perst_nic_1_n_deasserted",
            TimingEntry::JtagTrstNDeasserted => "jtag_trst_n_deasserted",
            TimingEntry::UcCassiniRdyNic0 => "uc_cassini_rdy_nic_0",
            TimingEntry::UcCassiniRdyNic1 => "uc_cassini_rdy_nic_1",
            TimingEntry::PcieLinkUpNic0 => "pcie_link_up_nic_0",
            TimingEntry::PcieLinkUpNic1 => "pcie_link_up_nic_1",
            TimingEntry::Uptime => "uptime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct TimingsResponse {
    pub entries_us: [U64<LE>; TIMING_NUM_ENTRIES],
}

impl TimingsResponse {
    /// Microseconds since power-on at which `entry` was reached.
    pub fn entry_us(&self, entry: TimingEntry) -> u64 {
        self.entries_us[entry as usize].get()
    }
}
