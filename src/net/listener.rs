//! TCP status listener.
//!
//! # Responsibilities
//! - Bind to the configured `server.port`
//! - Answer each connection with a one-line status banner
//! - Stop accepting when shutdown is broadcast

use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::config::ServerSettings;

/// Error type for listener operations.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// Listener answering status probes until shutdown.
pub struct StatusListener {
    inner: TcpListener,
    banner: String,
}

impl StatusListener {
    /// Bind on all interfaces at the configured port.
    pub async fn bind(settings: &ServerSettings) -> Result<Self, ListenerError> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, settings.port))).await
    }

    pub async fn bind_addr(addr: SocketAddr) -> Result<Self, ListenerError> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;

        let local_addr = inner
            .local_addr()
            .map_err(|source| ListenerError::Bind { addr, source })?;
        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self {
            inner,
            banner: status_banner(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Accept until `shutdown` fires. Returns the number of connections served.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<u64, ListenerError> {
        let mut served = 0u64;
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(served, "Listener stopped");
                    return Ok(served);
                }
                accepted = self.inner.accept() => {
                    let (stream, peer_addr) = accepted.map_err(ListenerError::Accept)?;
                    served += 1;
                    tracing::debug!(peer_addr = %peer_addr, "Connection accepted");

                    let banner = self.banner.clone();
                    tokio::spawn(async move {
                        if let Err(e) = answer(stream, &banner).await {
                            tracing::debug!(peer_addr = %peer_addr, error = %e, "Status write failed");
                        }
                    });
                }
            }
        }
    }
}

async fn answer(mut stream: TcpStream, banner: &str) -> std::io::Result<()> {
    stream.write_all(banner.as_bytes()).await?;
    stream.shutdown().await
}

/// `stagehand 0.1.0 pid=1234\n`
pub fn status_banner() -> String {
    format!(
        "{} {} pid={}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::process::id()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn banner_shape() {
        let banner = status_banner();
        assert!(banner.starts_with("stagehand "));
        assert!(banner.ends_with(&format!("pid={}\n", std::process::id())));
    }

    #[tokio::test]
    async fn serves_until_shutdown() {
        let listener = StatusListener::bind_addr("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = broadcast::channel(1);
        let task = tokio::spawn(listener.run(rx));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut line = String::new();
        stream.read_to_string(&mut line).await.unwrap();
        assert_eq!(line, status_banner());

        tx.send(()).unwrap();
        let served = task.await.unwrap().unwrap();
        assert_eq!(served, 1);
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let first = StatusListener::bind_addr("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = first.local_addr().unwrap();
        let err = StatusListener::bind_addr(addr).await.err().unwrap();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }
}
