use log::info;

use crate::messaging::domain::message_publisher::MessagePublisher;
use crate::session::SessionError;
use crate::shared::constants::MERGE_TOPIC;
use crate::shared::ticket::Ticket;

/// Requests merges for ready tickets by publishing to the merge topic.
///
/// Fire-and-forget: success means the queue accepted the request, not that
/// the merge ran. Readiness is not checked here: callers should have
/// consulted `TicketSession::ready`, and the merge worker re-validates
/// anyway, so a premature request is harmless.
pub struct MergeCoordinator {
    topic: String,
}

impl MergeCoordinator {
    pub fn new() -> Self {
        Self {
            topic: MERGE_TOPIC.to_string(),
        }
    }

    pub fn with_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    /// Emits one message carrying the ticket identifier. A rejected
    /// publish surfaces as `MergePublish`; no prior state was committed,
    /// so there is nothing to roll back.
    pub fn request_merge(
        &self,
        publisher: &dyn MessagePublisher,
        ticket: &Ticket,
    ) -> Result<(), SessionError> {
        publisher
            .publish(&self.topic, ticket.as_str().as_bytes())
            .map_err(|source| SessionError::MergePublish {
                ticket: ticket.to_string(),
                source,
            })?;
        info!("merge requested for ticket {ticket}");
        Ok(())
    }
}

impl Default for MergeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
