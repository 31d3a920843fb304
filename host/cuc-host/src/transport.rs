// Licensed under the Apache-2.0 license

//! The byte transport the dispatcher runs over.
//!
//! USB, SMBus and HSN drivers live outside this crate. All they provide is a
//! blocking request/response exchange of whole packets; timeouts and
//! cancellation are theirs to handle.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No response arrived in time.
    #[error("operation timed out")]
    Timeout,

    /// The link to the uC went away.
    #[error("connection lost")]
    ConnectionLost,

    /// The driver could not frame the packet.
    #[error("invalid packet")]
    InvalidPacket,

    #[error("endpoint unavailable")]
    EndpointUnavailable,

    #[error("operation failed")]
    OperationFailed,
}

pub trait CucTransport {
    /// Sends one encoded request packet and returns the response packet.
    fn transmit(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError>;
}

impl<T: CucTransport + ?Sized> CucTransport for &mut T {
    fn transmit(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).transmit(request)
    }
}

impl<T: CucTransport + ?Sized> CucTransport for Box<T> {
    fn transmit(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).transmit(request)
    }
}
