// Licensed under the Apache-2.0 license

pub mod base;
pub mod platform;
pub mod sensor_value;
