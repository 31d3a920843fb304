// Licensed under the Apache-2.0 license

//! Host side of the Cassini uC command interface: command dispatch over a
//! caller supplied transport, multi-part PDR retrieval and firmware update
//! tracking.

pub mod dispatcher;
pub mod error;
pub mod fw_update;
pub mod pdr_session;
pub mod transport;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::CucHostError;
pub use fw_update::FirmwareUpdateSession;
pub use pdr_session::{PdrTransferMode, PdrTransferSession};
pub use transport::{CucTransport, TransportError};
