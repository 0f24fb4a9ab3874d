//! transport.rs
//!
//! One-message-per-connection TCP transport.
//!
//! Inbound: a dedicated accept loop spawns one task per connection. That task
//! reads a single line, decodes it and then waits for a slot in the node's
//! bounded worker pool before running the handler.
//!
//! Outbound: every message asks the fault seam first, waits out any delay on
//! the sender side, then dials, writes one line and closes.

use std::net::SocketAddr;
use std::sync::Arc;

use council_common::{Message, NodeId};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::P2pConfig;
use crate::error::NetworkError;
use crate::peers::PeerTable;
use crate::ports::MessageHandler;
use crate::simulator::{FaultInjector, Transit};

#[derive(Clone)]
pub struct TcpTransport {
    local: NodeId,
    peers: Arc<PeerTable>,
    faults: Arc<dyn FaultInjector>,
    config: P2pConfig,
}

impl TcpTransport {
    pub fn new(
        local: NodeId,
        peers: Arc<PeerTable>,
        faults: Arc<dyn FaultInjector>,
        config: P2pConfig,
    ) -> Self {
        Self { local, peers, faults, config }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        self.peers
            .address_of(self.local)
            .ok_or(NetworkError::PeerNotFound(self.local))
    }

    /// Binds this node's own endpoint (`base_port + id`).
    pub async fn bind(&self) -> Result<TcpListener, NetworkError> {
        let addr = self.local_addr()?;
        TcpListener::bind(addr)
            .await
            .map_err(|source| NetworkError::Bind { addr, source })
    }

    /// Spawns the accept loop. It only ends with the runtime.
    pub fn serve<H>(&self, listener: TcpListener, handler: Arc<H>) -> JoinHandle<()>
    where
        H: MessageHandler + ?Sized + 'static,
    {
        let local = self.local;
        let pool = Arc::new(Semaphore::new(self.config.workers()));
        let read_timeout = self.config.read_timeout();
        let max_line = self.config.max_line_bytes;

        tokio::spawn(async move {
            loop {
                let (stream, remote) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("⚠️ Nó {} falhou ao aceitar conexão: {}", local, e);
                        continue;
                    }
                };

                let handler = Arc::clone(&handler);
                let pool = Arc::clone(&pool);
                tokio::spawn(async move {
                    let message = match read_message(stream, read_timeout, max_line).await {
                        Ok(Some(message)) => message,
                        Ok(None) => {
                            debug!("node {}: {} closed without sending a line", local, remote);
                            return;
                        }
                        Err(e) => {
                            warn!("🧩 Nó {} descartou mensagem de {}: {}", local, remote, e);
                            return;
                        }
                    };

                    // acquire only fails on a closed semaphore
                    let Ok(_permit) = pool.acquire().await else {
                        return;
                    };
                    handler.handle(message).await;
                });
            }
        })
    }

    /// Delivers `message` to `target` on a fresh connection.
    ///
    /// Never retries. `Unreachable` means the fault seam dropped it before any
    /// byte left this node.
    pub async fn send(&self, target: NodeId, message: &Message) -> Result<(), NetworkError> {
        let addr = self
            .peers
            .address_of(target)
            .ok_or(NetworkError::PeerNotFound(target))?;

        match self.faults.transit(self.local, target) {
            Transit::Unreachable => return Err(NetworkError::Unreachable(target)),
            Transit::Delayed(delay) if !delay.is_zero() => tokio::time::sleep(delay).await,
            Transit::Delayed(_) => {}
        }

        // The peer may have gone offline while we were sleeping.
        if self.faults.transit(self.local, target) == Transit::Unreachable {
            return Err(NetworkError::Unreachable(target));
        }

        let mut stream = tokio::time::timeout(self.config.connect_timeout(), TcpStream::connect(addr))
            .await
            .map_err(|_| NetworkError::Timeout(target))??;

        stream.write_all(message.to_line().as_bytes()).await?;
        stream.shutdown().await?;

        debug!("node {} -> {}: {}", self.local, target, message);
        Ok(())
    }

    /// Fire-and-forget variant used by the election layer: the send runs on
    /// its own task and failures are only logged.
    pub fn spawn_send(&self, target: NodeId, message: Message) -> JoinHandle<()> {
        let transport = self.clone();
        tokio::spawn(async move {
            match transport.send(target, &message).await {
                Ok(()) => {}
                Err(NetworkError::Unreachable(peer)) => {
                    warn!("📵 {} -> {} descartada: nó {} inalcançável", message, target, peer);
                }
                Err(e) => {
                    error!("❌ Falha ao enviar {} para nó {}: {}", message, target, e);
                }
            }
        })
    }
}

async fn read_message(
    stream: TcpStream,
    read_timeout: std::time::Duration,
    max_line: usize,
) -> Result<Option<Message>, Box<dyn std::error::Error + Send + Sync>> {
    let mut reader = BufReader::new(stream.take(max_line as u64));
    let mut line = String::new();

    let read = tokio::time::timeout(read_timeout, reader.read_line(&mut line)).await??;
    if read == 0 {
        return Ok(None);
    }
    // a full buffer without a newline means the line was cut
    if read >= max_line && !line.ends_with('\n') {
        return Err(NetworkError::LineTooLong(max_line).into());
    }

    Ok(Some(line.parse::<Message>()?))
}
