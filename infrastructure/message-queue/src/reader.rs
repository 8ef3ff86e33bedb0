use async_trait::async_trait;

/// One raw message read from a topic partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

/// Pull-based reader of one topic with manual acknowledgement.
///
/// A reader is driven by exactly one fetch loop, so it never sees concurrent calls.
#[async_trait]
pub trait MessageReader: Send {
    fn topic(&self) -> &str;

    /// Wait for the next message. Must be safe to drop while pending.
    async fn fetch(&mut self) -> anyhow::Result<InboundMessage>;

    /// Acknowledge `message` and everything before it on its partition.
    async fn commit(&mut self, message: &InboundMessage) -> anyhow::Result<()>;

    /// Give up on `message` for now, the next fetch returns it again.
    async fn release(&mut self, message: &InboundMessage) -> anyhow::Result<()>;

    async fn close(&mut self) -> anyhow::Result<()>;
}
