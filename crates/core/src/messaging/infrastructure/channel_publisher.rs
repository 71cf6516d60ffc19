use crossbeam_channel::{Receiver, Sender};

use crate::messaging::domain::message_publisher::MessagePublisher;

/// A published message as seen by an in-process consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// In-process publisher over a bounded channel.
///
/// Feeds the local merge worker in CLI runs and acts as the broker stand-in
/// in tests. A full channel or disconnected consumer surfaces as a publish
/// failure, mirroring a broker rejecting the message.
pub struct ChannelPublisher {
    sender: Sender<PublishedMessage>,
}

impl ChannelPublisher {
    /// Creates a publisher/consumer pair with the given channel capacity.
    pub fn bounded(capacity: usize) -> (Self, Receiver<PublishedMessage>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl MessagePublisher for ChannelPublisher {
    fn publish(
        &self,
        topic: &str,
        payload: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.sender
            .try_send(PublishedMessage {
                topic: topic.to_string(),
                payload: payload.to_vec(),
            })
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                format!("publish rejected: {e}").into()
            })
    }
}
