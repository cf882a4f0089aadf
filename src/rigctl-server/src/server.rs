// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Listener loop, live-connection registry and coordinated shutdown.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::connection::run_connection;
use crate::handlers::RigHandlers;

type ConnectionRegistry = Arc<Mutex<HashMap<u64, String>>>;

/// rigctl server: accepts connections and runs one handler task per
/// connection until it closes or `stop` is called.
pub struct Server {
    local_addr: Option<SocketAddr>,
    handlers: Arc<RigHandlers>,
    connections: ConnectionRegistry,
    next_id: Arc<AtomicU64>,
    shutdown_tx: watch::Sender<bool>,
    /// Completion barrier: every connection task and the accept loop hold a
    /// clone; `stop` drains the receiver until all clones are dropped.
    done_tx: mpsc::Sender<()>,
    done_rx: mpsc::Receiver<()>,
    listener_task: Option<JoinHandle<()>>,
}

impl Server {
    /// Bind a listener and start accepting connections in the background.
    pub async fn start(addr: SocketAddr, handlers: RigHandlers) -> std::io::Result<Server> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let mut server = Server::detached(handlers);
        server.local_addr = Some(local_addr);

        let handlers = Arc::clone(&server.handlers);
        let connections = Arc::clone(&server.connections);
        let next_id = Arc::clone(&server.next_id);
        let shutdown_rx = server.shutdown_tx.subscribe();
        let done_tx = server.done_tx.clone();
        server.listener_task = Some(tokio::spawn(accept_loop(
            listener,
            handlers,
            connections,
            next_id,
            shutdown_rx,
            done_tx,
        )));

        info!("rigctl server listening on {}", local_addr);
        Ok(server)
    }

    /// Server with no listener of its own; connections are injected with
    /// [`Server::spawn_connection`].
    pub fn detached(handlers: RigHandlers) -> Server {
        let (shutdown_tx, _) = watch::channel(false);
        let (done_tx, done_rx) = mpsc::channel(1);
        Server {
            local_addr: None,
            handlers: Arc::new(handlers),
            connections: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            shutdown_tx,
            done_tx,
            done_rx,
            listener_task: None,
        }
    }

    /// Address the listener is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of currently registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Serve a pre-established stream as if it had been accepted.
    pub fn spawn_connection<S>(&self, stream: S, label: &str)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        spawn_connection_task(
            stream,
            label.to_string(),
            &self.handlers,
            &self.connections,
            &self.next_id,
            self.shutdown_tx.subscribe(),
            self.done_tx.clone(),
        );
    }

    /// Stop accepting, terminate every live connection and wait until all
    /// handler tasks have actually exited.
    pub async fn stop(self) {
        let Server {
            shutdown_tx,
            done_tx,
            mut done_rx,
            listener_task,
            connections,
            ..
        } = self;

        let _ = shutdown_tx.send(true);
        if let Some(task) = listener_task {
            let _ = task.await;
        }

        // Barrier: recv yields None once every handler and the accept loop
        // have dropped their sender clone.
        drop(done_tx);
        while done_rx.recv().await.is_some() {}

        let leftover = connections.lock().map(|c| c.len()).unwrap_or(0);
        if leftover != 0 {
            warn!("{} connection(s) still registered after drain", leftover);
        }
        info!("rigctl server stopped");
    }
}

async fn accept_loop(
    listener: TcpListener,
    handlers: Arc<RigHandlers>,
    connections: ConnectionRegistry,
    next_id: Arc<AtomicU64>,
    mut shutdown_rx: watch::Receiver<bool>,
    done_tx: mpsc::Sender<()>,
) {
    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        info!("rigctl client connected: {}", peer);
                        spawn_connection_task(
                            stream,
                            peer.to_string(),
                            &handlers,
                            &connections,
                            &next_id,
                            shutdown_rx.clone(),
                            done_tx.clone(),
                        );
                    }
                    Err(e) => {
                        error!("accept failed: {}", e);
                        break;
                    }
                }
            }
        }
    }
    debug!("rigctl accept loop exited");
}

fn spawn_connection_task<S>(
    stream: S,
    label: String,
    handlers: &Arc<RigHandlers>,
    connections: &ConnectionRegistry,
    next_id: &Arc<AtomicU64>,
    shutdown_rx: watch::Receiver<bool>,
    done_tx: mpsc::Sender<()>,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let id = next_id.fetch_add(1, Ordering::SeqCst);
    if let Ok(mut conns) = connections.lock() {
        conns.insert(id, label.clone());
    }

    let handlers = Arc::clone(handlers);
    let connections = Arc::clone(connections);
    tokio::spawn(async move {
        // Held until the task returns; releases the completion barrier.
        let _done = done_tx;
        if let Err(e) = run_connection(stream, &label, &handlers, shutdown_rx).await {
            warn!("connection {} error: {}", label, e);
        }
        if let Ok(mut conns) = connections.lock() {
            conns.remove(&id);
        }
        debug!("connection {} closed", label);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::io::AsyncReadExt;
    use tokio::time;

    use rigctl_client::Client;
    use rigctl_core::mode::Mode;

    fn test_handlers() -> RigHandlers {
        let mut h = RigHandlers::new();
        h.get_freq = Some(Arc::new(|| Ok(7000000.0)));
        h.get_mode = Some(Arc::new(|| Ok((Mode::USB, 2400))));
        // Echoes the argument back as the status code, which lets tests
        // detect a response delivered to the wrong connection.
        h.set_antenna = Some(Arc::new(|v| Err(v)));
        h
    }

    #[tokio::test]
    async fn unbound_verb_errors_and_connection_survives() {
        let server = Server::detached(test_handlers());
        let (near, far) = tokio::io::duplex(1024);
        server.spawn_connection(near, "test");

        let mut client = Client::from_stream(far);
        // No get_antenna handler is bound.
        assert!(client.get_antenna().await.is_err());
        // The same connection must still answer a valid command.
        assert_eq!(client.get_freq().await.unwrap(), 7000000.0);

        server.stop().await;
    }

    #[tokio::test]
    async fn get_mode_round_trip_through_server() {
        let server = Server::detached(test_handlers());
        let (near, far) = tokio::io::duplex(1024);
        server.spawn_connection(near, "test");

        let mut client = Client::from_stream(far);
        assert_eq!(client.get_mode().await.unwrap(), (Mode::USB, 2400));

        server.stop().await;
    }

    #[tokio::test]
    async fn concurrent_connections_never_cross_responses() {
        let server = Server::detached(test_handlers());

        let mut tasks = Vec::new();
        for i in 0..4i32 {
            let (near, far) = tokio::io::duplex(1024);
            server.spawn_connection(near, &format!("conn-{}", i));
            tasks.push(tokio::spawn(async move {
                let mut client = Client::from_stream(far);
                for j in 0..8 {
                    let code = 100 * (i + 1) + j;
                    assert_eq!(client.set_antenna(code).await.unwrap(), code);
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn stop_drains_active_connections() {
        let server = Server::detached(test_handlers());

        let mut fars = Vec::new();
        for i in 0..3 {
            let (near, far) = tokio::io::duplex(1024);
            server.spawn_connection(near, &format!("idle-{}", i));
            fars.push(far);
        }
        assert_eq!(server.connection_count(), 3);

        // All handlers are blocked in a read; stop must still return.
        time::timeout(Duration::from_secs(5), server.stop())
            .await
            .expect("stop must return after the drain");

        // Every handler released its transport.
        for far in fars {
            let (mut reader, _writer) = tokio::io::split(far);
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).await.unwrap();
            assert!(buf.is_empty());
        }
    }

    #[tokio::test]
    async fn handler_exit_removes_registry_entry() {
        let server = Server::detached(test_handlers());
        let (near, far) = tokio::io::duplex(1024);
        server.spawn_connection(near, "short-lived");
        assert_eq!(server.connection_count(), 1);

        drop(far);
        // The handler notices EOF and deregisters itself.
        for _ in 0..50 {
            if server.connection_count() == 0 {
                break;
            }
            time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(server.connection_count(), 0);

        server.stop().await;
    }

    #[tokio::test]
    #[ignore = "requires TCP bind permissions"]
    async fn tcp_round_trips_and_stop_barrier() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut handlers = test_handlers();
        let hits = Arc::clone(&counter);
        handlers.get_mem = Some(Arc::new(move || {
            Ok(hits.fetch_add(1, Ordering::SeqCst) as i32)
        }));

        let server = Server::start("127.0.0.1:0".parse().unwrap(), handlers)
            .await
            .expect("bind");
        let addr = server.local_addr().expect("bound address");

        let mut tasks = Vec::new();
        for _ in 0..4 {
            tasks.push(tokio::spawn(async move {
                let mut client = Client::connect(&addr.ip().to_string(), addr.port())
                    .await
                    .expect("connect");
                for _ in 0..5 {
                    client.get_mem().await.expect("round trip");
                }
                client
            }));
        }
        let mut clients = Vec::new();
        for task in tasks {
            clients.push(task.await.unwrap());
        }
        assert_eq!(counter.load(Ordering::SeqCst), 20);

        // Clients are still connected and idle; stop must drain them all.
        time::timeout(Duration::from_secs(5), server.stop())
            .await
            .expect("stop must return after the drain");

        // The far end observes the close.
        for mut client in clients {
            assert!(client.get_freq().await.is_err());
        }
    }
}
