// Licensed under the Apache-2.0 license

//! PLDM codec for the messages the Cassini uC answers: the base header,
//! GetSensorReading, GetPDR, and the records those return.

pub mod codec;
pub mod error;
pub mod fru;
pub mod message;
pub mod pdr;
pub mod protocol;
