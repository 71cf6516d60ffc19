/// Domain interface for fire-and-forget message publishing.
///
/// Success means the broker accepted the message, not that a consumer
/// processed it.
pub trait MessagePublisher: Send + Sync {
    fn publish(
        &self,
        topic: &str,
        payload: &[u8],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
