//! Development Server
//!
//! Serves a [`MemStore`] over the block framing. One thread per client,
//! bounded by `max_connections`.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::TransportError;
use crate::memtable::MemStore;
use crate::protocol::Response;

use super::frame::{read_frame, write_frame};

/// How long the accept loop sleeps between shutdown checks
const ACCEPT_POLL: Duration = Duration::from_millis(20);

/// TCP server for the in-memory store
pub struct Server {
    config: Config,
    store: Arc<MemStore>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind `config.listen_addr`
    pub fn bind(config: Config, store: Arc<MemStore>) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }

    /// Flag that stops `run` when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Accept connections until shutdown (blocking)
    pub fn run(&self) -> Result<(), TransportError> {
        tracing::info!("Listening on {}", self.local_addr()?);

        while !self.shutdown.load(Ordering::Relaxed) {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if self.active.load(Ordering::Relaxed) >= self.config.max_connections {
                tracing::warn!("Rejecting {}: connection limit reached", peer);
                continue;
            }

            // Accepted sockets may inherit non-blocking mode on some platforms
            if let Err(e) = stream.set_nonblocking(false) {
                tracing::warn!("Failed to set up connection from {}: {}", peer, e);
                continue;
            }

            let session = match Session::new(stream, Arc::clone(&self.store), &self.config) {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!("Failed to set up connection from {}: {}", peer, e);
                    continue;
                }
            };

            let active = Arc::clone(&self.active);
            active.fetch_add(1, Ordering::Relaxed);
            thread::spawn(move || {
                let mut session = session;
                if let Err(e) = session.handle() {
                    tracing::warn!("Connection {} ended with error: {}", session.peer_addr, e);
                }
                active.fetch_sub(1, Ordering::Relaxed);
            });
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }
}

/// Handles a single client connection
struct Session {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    store: Arc<MemStore>,
    peer_addr: String,
    max_frame_size: usize,
}

impl Session {
    fn new(stream: TcpStream, store: Arc<MemStore>, config: &Config) -> Result<Self, TransportError> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            store,
            peer_addr,
            max_frame_size: config.max_frame_size,
        })
    }

    /// Read packets in a loop and answer each one
    ///
    /// Returns when the client disconnects or an error occurs.
    fn handle(&mut self) -> Result<(), TransportError> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let tokens = match read_frame(&mut self.reader, self.max_frame_size) {
                Ok(Some(tokens)) => tokens,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(TransportError::Io(ref e))
                    if matches!(
                        e.kind(),
                        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
                    ) =>
                {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let reply = Response::client_error(&e.to_string()).into_tokens();
                    let _ = write_frame(&mut self.writer, &reply);
                    return Err(e);
                }
            };

            tracing::trace!("Received from {}: {:?}", self.peer_addr, tokens);

            let reply = match tokens.split_first() {
                Some((command, args)) => self.store.dispatch(command, args),
                None => Response::client_error("empty request").into_tokens(),
            };

            if let Err(e) = write_frame(&mut self.writer, &reply) {
                if let TransportError::Io(ref io_err) = e {
                    if matches!(
                        io_err.kind(),
                        ErrorKind::ConnectionAborted
                            | ErrorKind::ConnectionReset
                            | ErrorKind::BrokenPipe
                    ) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }
}
