use async_trait::async_trait;
use council_common::Message;
use council_p2p::MessageHandler;

use crate::cluster::core::Node;

#[async_trait]
impl MessageHandler for Node {
    async fn handle(&self, message: Message) {
        let mut engine = self.engine.lock().await;
        let envelopes = engine.on_message(message);
        self.dispatch(envelopes);
    }
}
