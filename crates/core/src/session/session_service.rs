//! The boundary surface the (external) HTTP layer calls into.
//!
//! Four logical operations per ticket: upload, readiness poll, merge
//! request, completion poll. Every one verifies ticket ownership before
//! touching state.

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use log::{debug, info};

use crate::messaging::domain::message_publisher::MessagePublisher;
use crate::session::merge_coordinator::MergeCoordinator;
use crate::session::ticket_session::{authorize, CompletionStatus, TicketSession};
use crate::session::SessionError;
use crate::shared::constants::MAX_UPLOAD_BYTES;
use crate::shared::ticket::Ticket;
use crate::storage::domain::object_store::{ObjectMetadata, ObjectStore, StorageArea};

pub struct SessionService {
    store: Arc<dyn ObjectStore>,
    publisher: Arc<dyn MessagePublisher>,
    coordinator: MergeCoordinator,
    max_upload_bytes: usize,
}

impl SessionService {
    pub fn new(store: Arc<dyn ObjectStore>, publisher: Arc<dyn MessagePublisher>) -> Self {
        Self {
            store,
            publisher,
            coordinator: MergeCoordinator::new(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_limits(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Stores one upload under `{ticket}/{basename}`. The shrink value is
    /// carried raw in metadata; the pipeline clamps it at use time.
    pub fn upload(
        &self,
        session_ticket: &Ticket,
        ticket: &Ticket,
        filename: &str,
        bytes: &[u8],
        shrink_percent: Option<&str>,
    ) -> Result<(), SessionError> {
        authorize(session_ticket, ticket)?;

        if bytes.len() > self.max_upload_bytes {
            return Err(SessionError::TooLarge {
                size: bytes.len(),
                limit: self.max_upload_bytes,
            });
        }

        // Client-supplied filenames are reduced to their basename so they
        // cannot escape the ticket's key prefix.
        let basename = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty() && *n != "." && *n != "..")
            .ok_or_else(|| SessionError::InvalidPayload(format!("bad filename {filename:?}")))?;

        let key = format!("{ticket}/{basename}");
        let metadata = ObjectMetadata {
            shrink_percent: shrink_percent.map(str::to_string),
        };
        self.store
            .put(StorageArea::Input, &key, bytes, &metadata)
            .map_err(SessionError::Store)?;
        info!("stored upload {key} ({} bytes)", bytes.len());
        Ok(())
    }

    /// Accepts a `data:<mime>;base64,<payload>` upload as browsers send.
    pub fn upload_data_uri(
        &self,
        session_ticket: &Ticket,
        ticket: &Ticket,
        filename: &str,
        data_uri: &str,
        shrink_percent: Option<&str>,
    ) -> Result<(), SessionError> {
        let bytes = decode_data_uri(data_uri)?;
        self.upload(session_ticket, ticket, filename, &bytes, shrink_percent)
    }

    pub fn is_ready(
        &self,
        session_ticket: &Ticket,
        ticket: &Ticket,
    ) -> Result<bool, SessionError> {
        authorize(session_ticket, ticket)?;
        let ready = TicketSession::new(ticket.clone()).ready(self.store.as_ref())?;
        debug!("ticket {ticket} ready: {ready}");
        Ok(ready)
    }

    pub fn request_merge(
        &self,
        session_ticket: &Ticket,
        ticket: &Ticket,
    ) -> Result<(), SessionError> {
        authorize(session_ticket, ticket)?;
        self.coordinator
            .request_merge(self.publisher.as_ref(), ticket)
    }

    pub fn is_complete(
        &self,
        session_ticket: &Ticket,
        ticket: &Ticket,
    ) -> Result<CompletionStatus, SessionError> {
        authorize(session_ticket, ticket)?;
        TicketSession::new(ticket.clone()).completion(self.store.as_ref())
    }
}

/// Decodes a `data:<mime>;base64,<payload>` string to raw bytes.
fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>, SessionError> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| SessionError::InvalidPayload("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SessionError::InvalidPayload("missing payload separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(SessionError::InvalidPayload(
            "only base64 data URIs are accepted".into(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| SessionError::InvalidPayload(format!("base64: {e}")))
}
