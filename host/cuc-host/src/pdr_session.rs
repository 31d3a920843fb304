// Licensed under the Apache-2.0 license

//! Multi-part GetPDR retrieval.
//!
//! A record larger than one response arrives in parts that have to be
//! requested one at a time and stitched back together. In table mode the
//! session then follows `next_record_handle` through the whole repository.
//!
//! The session never talks to the transport itself. Callers either feed it
//! responses through [`PdrTransferSession::next_request`] and
//! [`PdrTransferSession::handle_response`], or let
//! [`PdrTransferSession::run`] do that with a [`Dispatcher`].

use crate::dispatcher::Dispatcher;
use crate::error::CucHostError;
use crate::transport::CucTransport;
use cuc_common::protocol::CUC_MAX_PAYLOAD;
use log::{debug, error, info, warn};
use pldm_cxi::message::platform::{GetPdrResponse, GET_PDR_RESPONSE_FIXED_LEN};
use pldm_cxi::pdr::{parse_pdr_table, Pdr, PdrHeader, PDR_HEADER_LEN};
use pldm_cxi::protocol::base::{TransferOperationFlag, TransferRespFlag};
use pldm_cxi::protocol::platform::GetPdrCompletionCode;
use smlang::statemachine;
use zerocopy::FromBytes;

pub const DEFAULT_PDR_REQUEST_COUNT: u16 = 128;

/// Largest request count whose response, transfer CRC included, still fits
/// in one uC packet.
pub const MAX_PDR_REQUEST_COUNT: u16 = (CUC_MAX_PAYLOAD - GET_PDR_RESPONSE_FIXED_LEN - 1) as u16;

/// Parts accepted in one session before the device is assumed to be looping.
pub const MAX_PDR_TRANSFER_PARTS: usize = 1024;

statemachine! {
    derive_states: [Debug, Clone],
    derive_events: [Clone, Debug],
    transitions: {
        *Idle + Start / on_start = Requesting,
        Requesting + PartReceived(PdrPart) / on_part = Accumulating,
        Accumulating + PartReceived(PdrPart) / on_part = Accumulating,
        Requesting + RecordComplete(PdrPart) / on_record_complete = Requesting,
        Accumulating + RecordComplete(PdrPart) / on_record_complete = Requesting,
        Requesting + TransferComplete(PdrPart) / on_transfer_complete = Done,
        Accumulating + TransferComplete(PdrPart) / on_transfer_complete = Done,
        Requesting + Abort(CucHostError) / on_abort = Failed,
        Accumulating + Abort(CucHostError) / on_abort = Failed,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdrTransferMode {
    /// Stop after the record the session started with.
    SingleRecord,
    /// Keep following `next_record_handle` until it is zero.
    Table,
}

/// The GetPDR request the session wants sent next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdrRequest {
    pub record_handle: u32,
    pub data_transfer_handle: u32,
    pub transfer_operation_flag: TransferOperationFlag,
    pub request_count: u16,
    pub record_change_number: u16,
}

impl PdrRequest {
    fn first_part(record_handle: u32, request_count: u16) -> Self {
        PdrRequest {
            record_handle,
            data_transfer_handle: 0,
            transfer_operation_flag: TransferOperationFlag::GetFirstPart,
            request_count,
            record_change_number: 0,
        }
    }
}

/// An accepted response part and the request that follows it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct PdrPart {
    data: Vec<u8>,
    next: Option<PdrRequest>,
}

struct TransferContext {
    mode: PdrTransferMode,
    request_count: u16,
    first_record_handle: u32,
    request: PdrRequest,
    record: Vec<u8>,
    table: Vec<u8>,
    parts: usize,
    visited: Vec<u32>,
    failure: Option<CucHostError>,
}

impl TransferContext {
    fn accept(&mut self, part: PdrPart) {
        self.parts += 1;
        self.record.extend_from_slice(&part.data);
        if let Some(next) = part.next {
            self.request = next;
        }
    }

    fn finish_record(&mut self) {
        info!(
            "PDR record {:#x} assembled ({} bytes)",
            self.request.record_handle,
            self.record.len()
        );
        self.table.append(&mut self.record);
    }
}

impl StateMachineContext for TransferContext {
    fn on_start(&mut self) -> Result<(), ()> {
        debug!("PDR transfer: start at record {:#x}", self.first_record_handle);
        self.request = PdrRequest::first_part(self.first_record_handle, self.request_count);
        self.record.clear();
        self.table.clear();
        self.parts = 0;
        self.visited = vec![self.first_record_handle];
        self.failure = None;
        Ok(())
    }

    fn on_part(&mut self, part: PdrPart) -> Result<(), ()> {
        debug!("PDR transfer: part of {} bytes", part.data.len());
        self.accept(part);
        Ok(())
    }

    fn on_record_complete(&mut self, part: PdrPart) -> Result<(), ()> {
        // The record being finished is the one the current request names.
        let next = part.next;
        self.accept(PdrPart {
            data: part.data,
            next: None,
        });
        self.finish_record();
        if let Some(next) = next {
            debug!("PDR transfer: next record {:#x}", next.record_handle);
            self.visited.push(next.record_handle);
            self.request = next;
        }
        Ok(())
    }

    fn on_transfer_complete(&mut self, part: PdrPart) -> Result<(), ()> {
        self.accept(part);
        self.finish_record();
        info!(
            "PDR transfer done: {} bytes in {} parts",
            self.table.len(),
            self.parts
        );
        Ok(())
    }

    fn on_abort(&mut self, err: CucHostError) -> Result<(), ()> {
        error!(
            "PDR transfer aborted at record {:#x}: {}",
            self.request.record_handle, err
        );
        self.record.clear();
        self.table.clear();
        self.failure = Some(err);
        Ok(())
    }
}

pub struct PdrTransferSession {
    sm: StateMachine<TransferContext>,
}

impl PdrTransferSession {
    /// Reads the whole repository, starting from its first record.
    pub fn table() -> Self {
        Self::build(PdrTransferMode::Table, 0, DEFAULT_PDR_REQUEST_COUNT)
    }

    pub fn single_record(record_handle: u32) -> Self {
        Self::build(
            PdrTransferMode::SingleRecord,
            record_handle,
            DEFAULT_PDR_REQUEST_COUNT,
        )
    }

    pub fn with_request_count(
        mode: PdrTransferMode,
        record_handle: u32,
        request_count: u16,
    ) -> Result<Self, CucHostError> {
        if usize::from(request_count) < PDR_HEADER_LEN || request_count > MAX_PDR_REQUEST_COUNT {
            return Err(CucHostError::InvalidArgument(
                "PDR request count must cover a record header and fit one packet",
            ));
        }
        Ok(Self::build(mode, record_handle, request_count))
    }

    fn build(mode: PdrTransferMode, record_handle: u32, request_count: u16) -> Self {
        PdrTransferSession {
            sm: StateMachine::new(TransferContext {
                mode,
                request_count,
                first_record_handle: record_handle,
                request: PdrRequest::first_part(record_handle, request_count),
                record: Vec::new(),
                table: Vec::new(),
                parts: 0,
                visited: Vec::new(),
                failure: None,
            }),
        }
    }

    pub fn start(&mut self) -> Result<(), CucHostError> {
        self.fire(Events::Start)
            .map_err(|_| CucHostError::TransferAborted("session already started"))
    }

    pub fn state(&self) -> &States {
        self.sm.state()
    }

    pub fn mode(&self) -> PdrTransferMode {
        self.sm.context().mode
    }

    pub fn is_done(&self) -> bool {
        matches!(self.sm.state(), States::Done)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.sm.state(), States::Failed)
    }

    /// Why the session failed, once it has.
    pub fn failure(&self) -> Option<&CucHostError> {
        self.sm.context().failure.as_ref()
    }

    pub fn parts_received(&self) -> usize {
        self.sm.context().parts
    }

    /// The request to send next, or `None` when nothing is outstanding.
    pub fn next_request(&self) -> Option<PdrRequest> {
        match self.sm.state() {
            States::Requesting | States::Accumulating => Some(self.sm.context().request),
            _ => None,
        }
    }

    /// Feeds the outcome of the request from [`Self::next_request`].
    ///
    /// A failed exchange aborts the session. The error is returned and stays
    /// available through [`Self::failure`].
    pub fn handle_response(
        &mut self,
        response: Result<GetPdrResponse, CucHostError>,
    ) -> Result<(), CucHostError> {
        let request = self
            .next_request()
            .ok_or(CucHostError::TransferAborted("no request outstanding"))?;

        let event = match response.and_then(|rsp| self.classify(&request, rsp)) {
            Ok(event) => event,
            Err(err) => {
                let err = repository_change(err, request.record_handle);
                if err.is_retryable() {
                    warn!("PDR transfer interrupted, caller may retry: {}", err);
                }
                self.fire(Events::Abort(err.clone()))?;
                return Err(err);
            }
        };
        self.fire(event)
    }

    fn classify(&self, request: &PdrRequest, rsp: GetPdrResponse) -> Result<Events, CucHostError> {
        let ctx = self.sm.context();
        if ctx.parts >= MAX_PDR_TRANSFER_PARTS {
            return Err(CucHostError::TransferAborted("too many transfer parts"));
        }

        let flag = rsp.transfer_flag()?;
        let first_part = request.transfer_operation_flag == TransferOperationFlag::GetFirstPart;
        let in_sequence = match flag {
            TransferRespFlag::Start | TransferRespFlag::StartAndEnd => first_part,
            TransferRespFlag::Middle | TransferRespFlag::End => !first_part,
        };
        if !in_sequence {
            return Err(CucHostError::TransferAborted("transfer flag out of sequence"));
        }

        if !flag.is_last_part() {
            // Follow-up parts carry the change number from the record header,
            // known once the whole header has arrived.
            let record_change_number = record_header(&ctx.record, &rsp.record_data)
                .map_or(request.record_change_number, |header| {
                    header.record_change_number()
                });
            let next = PdrRequest {
                record_handle: request.record_handle,
                data_transfer_handle: rsp.next_data_transfer_handle(),
                transfer_operation_flag: TransferOperationFlag::GetNextPart,
                request_count: ctx.request_count,
                record_change_number,
            };
            return Ok(Events::PartReceived(PdrPart {
                data: rsp.record_data,
                next: Some(next),
            }));
        }

        // Handle 0 asks for the first record, whatever its handle is.
        if request.record_handle != 0 {
            if let Some(header) = record_header(&ctx.record, &rsp.record_data) {
                if header.record_handle() != request.record_handle {
                    return Err(CucHostError::RecordChanged {
                        record_handle: request.record_handle,
                        completion_code: None,
                    });
                }
            }
        }

        let next_record_handle = rsp.next_record_handle();
        if ctx.mode == PdrTransferMode::SingleRecord || next_record_handle == 0 {
            return Ok(Events::TransferComplete(PdrPart {
                data: rsp.record_data,
                next: None,
            }));
        }
        if ctx.visited.contains(&next_record_handle) {
            return Err(CucHostError::TransferAborted("record handle repeated"));
        }
        Ok(Events::RecordComplete(PdrPart {
            data: rsp.record_data,
            next: Some(PdrRequest::first_part(next_record_handle, ctx.request_count)),
        }))
    }

    fn fire(&mut self, event: Events) -> Result<(), CucHostError> {
        self.sm
            .process_event(event)
            .map(|_| ())
            .map_err(|_| CucHostError::TransferAborted("invalid PDR transfer transition"))
    }

    /// The concatenated record data, available once the session is Done.
    pub fn assembled(&self) -> Result<&[u8], CucHostError> {
        if !self.is_done() {
            return Err(CucHostError::NotAvailable);
        }
        Ok(&self.sm.context().table)
    }

    /// The assembled data decoded into records.
    pub fn records(&self) -> Result<Vec<Pdr>, CucHostError> {
        Ok(parse_pdr_table(self.assembled()?)?)
    }

    /// Runs the session to completion over `dispatcher`.
    pub fn run<T: CucTransport>(
        &mut self,
        dispatcher: &mut Dispatcher<T>,
    ) -> Result<Vec<Pdr>, CucHostError> {
        if matches!(self.sm.state(), States::Idle) {
            self.start()?;
        }
        while let Some(request) = self.next_request() {
            let response = dispatcher.get_pdr(
                request.record_handle,
                request.data_transfer_handle,
                request.transfer_operation_flag,
                request.request_count,
                request.record_change_number,
            );
            self.handle_response(response)?;
        }
        self.records()
    }
}

/// The header of the record being assembled, once enough of it is in.
fn record_header(assembled: &[u8], part: &[u8]) -> Option<PdrHeader> {
    let head: Vec<u8> = assembled
        .iter()
        .chain(part.iter())
        .take(PDR_HEADER_LEN)
        .copied()
        .collect();
    PdrHeader::read_from_prefix(&head)
        .ok()
        .map(|(header, _)| header)
}

fn repository_change(err: CucHostError, record_handle: u32) -> CucHostError {
    match err {
        CucHostError::PldmCompletion(code)
            if matches!(GetPdrCompletionCode::try_from(code), Ok(cc) if cc.is_repository_changed()) =>
        {
            CucHostError::RecordChanged {
                record_handle,
                completion_code: Some(code),
            }
        }
        other => other,
    }
}
