use async_trait::async_trait;
use council_common::Message;

/// Receiver side of the transport.
///
/// The transport decodes one line per inbound connection and hands the
/// message to whoever implements this. Handlers are invoked from the bounded
/// worker pool, never from the accept loop itself.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: Message);
}
