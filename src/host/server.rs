//! WebSocket listener for the host agent

use super::HostAgent;
use crate::error::SyncError;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

/// Host listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Interface to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// TCP port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    1984
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl HostConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bind.trim().is_empty() {
            return Err("Bind address cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Bound WebSocket server
pub struct HostServer {
    agent: HostAgent,
    listener: TcpListener,
}

impl HostServer {
    /// Bind the listener. Port 0 picks a free port.
    pub async fn bind(agent: HostAgent, config: &HostConfig) -> Result<Self, SyncError> {
        let address = config.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| SyncError::Transport(format!("Failed to bind {}: {}", address, e)))?;
        Ok(Self { agent, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SyncError> {
        self.listener
            .local_addr()
            .map_err(|e| SyncError::Transport(e.to_string()))
    }

    /// Accept connections until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), SyncError>
    where
        F: Future<Output = ()>,
    {
        let address = self.local_addr()?;
        info!(%address, "Host agent listening");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Host agent stopped");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let agent = self.agent.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(agent, stream, peer).await {
                                warn!(%peer, error = %e, "Connection ended with error");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "Failed to accept connection"),
                },
            }
        }
    }
}

/// Serve one client. Each text frame is answered on its own blocking task,
/// so a slow snapshot never holds up other requests on the same socket.
#[instrument(skip(agent, stream))]
async fn handle_connection(
    agent: HostAgent,
    stream: TcpStream,
    peer: SocketAddr,
) -> Result<(), SyncError> {
    let socket = accept_async(stream)
        .await
        .map_err(|e| SyncError::Transport(format!("WebSocket accept failed: {}", e)))?;
    info!("Client connected");

    let (mut sink, mut source) = socket.split();
    let (replies_tx, mut replies_rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(frame) = replies_rx.recv().await {
            if let Err(e) = sink.send(Message::Text(frame)).await {
                debug!(error = %e, "Failed to send reply");
                break;
            }
        }
    });

    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Text(frame)) => {
                let agent = agent.clone();
                let replies_tx = replies_tx.clone();
                tokio::spawn(async move {
                    match tokio::task::spawn_blocking(move || agent.handle_frame(&frame)).await {
                        Ok(reply) => {
                            let _ = replies_tx.send(reply);
                        }
                        Err(e) => error!(error = %e, "Snapshot task failed"),
                    }
                });
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "WebSocket receive failed");
                break;
            }
        }
    }

    drop(replies_tx);
    let _ = writer.await;
    info!("Client disconnected");
    Ok(())
}
