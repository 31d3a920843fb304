// Licensed under the Apache-2.0 license

pub mod board;
pub mod fan;
pub mod firmware;
pub mod interrupt;
pub mod led;
pub mod mac;
pub mod qsfp;
pub mod text;
pub mod timings;

pub use board::*;
pub use fan::*;
pub use firmware::*;
pub use interrupt::*;
pub use led::*;
pub use mac::*;
pub use qsfp::*;
pub use text::*;
pub use timings::*;
