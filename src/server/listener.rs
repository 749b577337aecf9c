use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::handler::Handler;
use crate::http::connection::Connection;
use crate::session::SessionStore;

/// TCP acceptor that owns the listening socket, the session store and
/// the handler, spawning one task per accepted connection.
pub struct Server {
    settings: Settings,
    handler: Arc<dyn Handler>,
    sessions: Option<Arc<SessionStore>>,
    local_addr: Option<SocketAddr>,
    accepted: Arc<AtomicU64>,
    stop: Arc<Notify>,
    acceptor: Option<JoinHandle<()>>,
}

impl Server {
    pub fn new(settings: Settings, handler: Arc<dyn Handler>) -> Self {
        Self {
            settings,
            handler,
            sessions: None,
            local_addr: None,
            accepted: Arc::new(AtomicU64::new(0)),
            stop: Arc::new(Notify::new()),
            acceptor: None,
        }
    }

    /// Binds the configured address and starts accepting connections.
    ///
    /// Returns the bound address; when the configuration asked for port
    /// 0 it carries the port the system actually assigned.
    pub async fn start(&mut self) -> anyhow::Result<SocketAddr> {
        if self.acceptor.is_some() {
            anyhow::bail!("server already started");
        }

        let listener = TcpListener::bind(&self.settings.server.listen)
            .await
            .with_context(|| format!("binding {}", self.settings.server.listen))?;
        let local_addr = listener.local_addr()?;
        self.local_addr = Some(local_addr);

        let sessions = if self.settings.session.enabled {
            Some(Arc::new(SessionStore::new(
                self.settings.session.timeout,
                self.settings.session.sweep_interval,
            )))
        } else {
            None
        };
        self.sessions = sessions.clone();

        info!(addr = %local_addr, "server listening");

        let settings = self.settings.clone();
        let handler = Arc::clone(&self.handler);
        let accepted = Arc::clone(&self.accepted);
        let stop = Arc::clone(&self.stop);

        self.acceptor = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.notified() => break,
                    incoming = listener.accept() => match incoming {
                        Ok((socket, peer)) => {
                            let total = accepted.fetch_add(1, Ordering::Relaxed) + 1;
                            debug!(%peer, total, "connection accepted");

                            let settings = settings.clone();
                            let handler = Arc::clone(&handler);
                            let sessions = sessions.clone();
                            tokio::spawn(async move {
                                let mut connection =
                                    Connection::new(socket, &settings, handler, sessions);
                                if let Err(err) = connection.run().await {
                                    error!(%peer, error = %err, "connection failed");
                                }
                            });
                        }
                        Err(err) => error!(error = %err, "accept failed"),
                    },
                }
            }
            debug!("accept loop stopped");
        }));

        Ok(local_addr)
    }

    /// Address the listener is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Connections accepted since the server started.
    pub fn total_connections(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Stops accepting connections and shuts the session sweeper down.
    ///
    /// Waits up to the configured close grace for the accept loop to
    /// finish before aborting it. Connections already running are left
    /// to complete on their own.
    pub async fn stop(&mut self) {
        self.stop.notify_one();

        if let Some(mut acceptor) = self.acceptor.take() {
            let close_wait = self.settings.server.close_wait;
            if tokio::time::timeout(close_wait, &mut acceptor).await.is_err() {
                acceptor.abort();
            }
        }

        if let Some(sessions) = self.sessions.take() {
            sessions.shutdown().await;
        }

        info!("server stopped");
    }
}
