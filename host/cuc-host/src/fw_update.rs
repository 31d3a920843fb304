// Licensed under the Apache-2.0 license

//! Host side of a uC firmware update.
//!
//! The uC does the actual work. The host announces the image, streams it in
//! packet-sized chunks and then polls FIRMWARE_UPDATE_STATUS until a terminal
//! status shows up. State only moves on polled status; nothing here retries or
//! backs off.

use crate::dispatcher::Dispatcher;
use crate::error::CucHostError;
use crate::transport::CucTransport;
use cuc_common::message::{FwSlot, FwUpdateState, FIRMWARE_DOWNLOAD_CHUNK};
use log::{debug, error, info};
use smlang::statemachine;

statemachine! {
    derive_states: [Debug, Clone],
    derive_events: [Clone, Debug],
    transitions: {
        *Starting + Accepted / on_accepted = Downloading,
        Downloading + ChunkSent(usize) / on_chunk_sent = Downloading,
        Downloading + Status(FwUpdateState) [is_terminal] / on_terminal = Finished,
        Downloading + Status(FwUpdateState) [!is_terminal] / on_progress = Polling,
        Polling + Status(FwUpdateState) [is_terminal] / on_terminal = Finished,
        Polling + Status(FwUpdateState) [!is_terminal] / on_progress = Polling,
    }
}

struct UpdateContext {
    nic: u8,
    size: u32,
    slot: FwSlot,
    bytes_sent: usize,
    last_state: Option<FwUpdateState>,
}

impl StateMachineContext for UpdateContext {
    fn is_terminal(&self, state: &FwUpdateState) -> Result<bool, ()> {
        Ok(state.is_terminal())
    }

    fn on_accepted(&mut self) -> Result<(), ()> {
        info!(
            "Firmware update started: nic {} slot {:?} size {}",
            self.nic, self.slot, self.size
        );
        Ok(())
    }

    fn on_chunk_sent(&mut self, len: usize) -> Result<(), ()> {
        self.bytes_sent += len;
        debug!("Firmware update: {}/{} bytes sent", self.bytes_sent, self.size);
        Ok(())
    }

    fn on_progress(&mut self, state: FwUpdateState) -> Result<(), ()> {
        if self.last_state != Some(state) {
            debug!("Firmware update: {:?}", state);
        }
        self.last_state = Some(state);
        Ok(())
    }

    fn on_terminal(&mut self, state: FwUpdateState) -> Result<(), ()> {
        if state.is_failure() {
            error!("Firmware update on nic {} failed: {:?}", self.nic, state);
        } else {
            info!("Firmware update on nic {} finished: {:?}", self.nic, state);
        }
        self.last_state = Some(state);
        Ok(())
    }
}

pub struct FirmwareUpdateSession {
    sm: StateMachine<UpdateContext>,
}

impl FirmwareUpdateSession {
    /// Announces an image of `size` bytes for `slot` on `nic`.
    ///
    /// `slot` is checked before anything is sent: only 0 (active) and 1
    /// (recovery) exist.
    pub fn start<T: CucTransport>(
        dispatcher: &mut Dispatcher<T>,
        nic: u8,
        size: u32,
        slot: u8,
    ) -> Result<Self, CucHostError> {
        let slot = FwSlot::try_from(slot).map_err(|_| CucHostError::InvalidSlot(slot))?;
        dispatcher.firmware_update_start(nic, size, slot)?;
        let mut session = Self::new(nic, size, slot);
        session.fire(Events::Accepted)?;
        Ok(session)
    }

    fn new(nic: u8, size: u32, slot: FwSlot) -> Self {
        FirmwareUpdateSession {
            sm: StateMachine::new(UpdateContext {
                nic,
                size,
                slot,
                bytes_sent: 0,
                last_state: None,
            }),
        }
    }

    /// Streams `image` to the uC. Its length must match the announced size.
    pub fn download<T: CucTransport>(
        &mut self,
        dispatcher: &mut Dispatcher<T>,
        image: &[u8],
    ) -> Result<(), CucHostError> {
        if !matches!(self.sm.state(), States::Downloading) {
            return Err(CucHostError::InvalidPhase("image download already over"));
        }
        if image.len() != self.sm.context().size as usize {
            return Err(CucHostError::InvalidArgument(
                "image length differs from announced size",
            ));
        }
        for chunk in image.chunks(FIRMWARE_DOWNLOAD_CHUNK) {
            dispatcher.firmware_update_download(chunk)?;
            self.fire(Events::ChunkSent(chunk.len()))?;
        }
        Ok(())
    }

    /// Reads the uC's update status once and steps the session with it.
    pub fn poll<T: CucTransport>(
        &mut self,
        dispatcher: &mut Dispatcher<T>,
    ) -> Result<FwUpdateState, CucHostError> {
        if self.is_terminal() {
            return Err(CucHostError::SessionFinished);
        }
        let status = dispatcher.firmware_update_status()?;
        self.observe(status.status)
    }

    /// Classifies a raw status byte and advances the session.
    pub fn observe(&mut self, status: u8) -> Result<FwUpdateState, CucHostError> {
        if self.is_terminal() {
            return Err(CucHostError::SessionFinished);
        }
        let state = FwUpdateState::try_from(status)?;
        self.fire(Events::Status(state))?;
        Ok(state)
    }

    fn fire(&mut self, event: Events) -> Result<(), CucHostError> {
        self.sm
            .process_event(event)
            .map(|_| ())
            .map_err(|_| CucHostError::InvalidPhase("unexpected update event"))
    }

    /// Last status seen, if any has been polled yet.
    pub fn state(&self) -> Option<FwUpdateState> {
        self.sm.context().last_state
    }

    pub fn phase(&self) -> &States {
        self.sm.state()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.sm.state(), States::Finished)
    }

    pub fn bytes_sent(&self) -> usize {
        self.sm.context().bytes_sent
    }

    pub fn slot(&self) -> FwSlot {
        self.sm.context().slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuc_common::message::FwUpdateFailure;

    fn accepted() -> FirmwareUpdateSession {
        let mut session = FirmwareUpdateSession::new(0, 16, FwSlot::Active);
        session.fire(Events::Accepted).unwrap();
        session
    }

    #[test]
    fn test_progress_then_success() {
        let mut session = accepted();
        assert_eq!(session.state(), None);
        assert_eq!(session.observe(0x00).unwrap(), FwUpdateState::Started);
        assert!(!session.is_terminal());
        assert!(matches!(session.phase(), States::Polling));
        assert_eq!(session.observe(0x04).unwrap(), FwUpdateState::Flashing);
        assert_eq!(session.observe(0x81).unwrap(), FwUpdateState::Success);
        assert!(session.is_terminal());
        assert!(session.state().unwrap().is_success());
    }

    #[test]
    fn test_idle_is_terminal_but_not_success() {
        let mut session = accepted();
        let state = session.observe(0x80).unwrap();
        assert_eq!(state, FwUpdateState::Idle);
        assert!(session.is_terminal());
        assert!(!state.is_success());
        assert!(!state.is_failure());
    }

    #[test]
    fn test_failure_sub_reason() {
        let mut session = accepted();
        assert_eq!(
            session.observe(0x83).unwrap(),
            FwUpdateState::Failed(FwUpdateFailure::BadSignature)
        );
        assert!(session.is_terminal());
        assert_eq!(session.observe(0x00), Err(CucHostError::SessionFinished));
    }

    #[test]
    fn test_unknown_progress_code() {
        let mut session = accepted();
        assert_eq!(
            session.observe(0x42),
            Err(CucHostError::UnknownTag {
                kind: "firmware update status",
                value: 0x42
            })
        );
        assert!(!session.is_terminal());
    }
}
