// Licensed under the Apache-2.0 license

pub mod get_pdr;
pub mod get_sensor_reading;

pub use get_pdr::*;
pub use get_sensor_reading::*;
