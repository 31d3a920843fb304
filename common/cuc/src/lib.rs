// Licensed under the Apache-2.0 license

//! Wire format of the Cassini uC command interface.
//!
//! Every exchange is a single `[cmd][count][type][data]` packet in each
//! direction, whatever the physical link (USB, SMBus or the HSN).

pub mod codec;
pub mod firmware_target;
pub mod message;
pub mod packet;
pub mod protocol;
