// Licensed under the Apache-2.0 license

use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U16};

/// FRU Record Set PDR (DSP0248 Table 94). Ties a FRU record set in the FRU
/// table to the entity it describes.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, PartialEq)]
#[repr(C, packed)]
pub struct FruRecordSetPdr {
    pub terminus_handle: U16<LE>,
    pub fru_record_set_identifier: U16<LE>,
    pub entity_type: U16<LE>,
    pub entity_instance_number: U16<LE>,
    pub container_id: U16<LE>,
}
