//! Derived session state for one ticket.
//!
//! Nothing is stored: every predicate recomputes the per-area object
//! counts from the store, so re-querying is idempotent and the session
//! survives process restarts for free. Reads race concurrent workers and
//! are eventually consistent; callers re-poll rather than trusting a
//! single observation.

use crate::session::SessionError;
use crate::shared::constants::OUTPUT_ARTIFACT;
use crate::shared::session_counts::SessionCounts;
use crate::shared::ticket::Ticket;
use crate::storage::domain::object_store::{ObjectStore, StorageArea};

/// Lifecycle phase derived from counts.
///
/// A merge in flight is indistinguishable from `Ready` until the worker
/// writes the output artifact; callers poll completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uploading,
    Ready,
    Complete,
}

/// Completion report for the boundary surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionStatus {
    pub complete: bool,
    /// Public URL of the merged artifact; meaningful once `complete`.
    pub url: String,
}

/// Stateless view over one ticket's objects.
pub struct TicketSession {
    ticket: Ticket,
}

impl TicketSession {
    pub fn new(ticket: Ticket) -> Self {
        Self { ticket }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// Object key prefix scoping this ticket in every area.
    pub fn prefix(&self) -> String {
        format!("{}/", self.ticket)
    }

    /// Recomputes the per-area counts. Never cached.
    pub fn counts(&self, store: &dyn ObjectStore) -> Result<SessionCounts, SessionError> {
        let prefix = self.prefix();
        let count = |area| -> Result<usize, SessionError> {
            Ok(store
                .list(area, &prefix)
                .map_err(SessionError::Store)?
                .len())
        };
        Ok(SessionCounts {
            input: count(StorageArea::Input)?,
            interim: count(StorageArea::Interim)?,
            output: count(StorageArea::Output)?,
        })
    }

    /// True once per-image normalization drained the input area and at
    /// least two frames await merging.
    pub fn ready(&self, store: &dyn ObjectStore) -> Result<bool, SessionError> {
        Ok(self.counts(store)?.ready())
    }

    /// Whether the merged artifact exists, and where it is served from.
    pub fn completion(&self, store: &dyn ObjectStore) -> Result<CompletionStatus, SessionError> {
        let complete = self.counts(store)?.complete();
        let key = format!("{}/{}", self.ticket, OUTPUT_ARTIFACT);
        Ok(CompletionStatus {
            complete,
            url: store.url(StorageArea::Output, &key),
        })
    }

    pub fn state(&self, store: &dyn ObjectStore) -> Result<SessionState, SessionError> {
        let counts = self.counts(store)?;
        Ok(if counts.complete() {
            SessionState::Complete
        } else if counts.ready() {
            SessionState::Ready
        } else {
            SessionState::Uploading
        })
    }
}

/// Verifies the caller's session-bound ticket against the ticket named in
/// the request. Every boundary operation runs this before touching state.
pub fn authorize(session_ticket: &Ticket, requested: &Ticket) -> Result<(), SessionError> {
    if session_ticket == requested {
        Ok(())
    } else {
        Err(SessionError::InvalidTicket {
            requested: requested.to_string(),
        })
    }
}
