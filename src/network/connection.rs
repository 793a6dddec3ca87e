//! TCP Transport
//!
//! One blocking connection to the store. Round trips are serialized by a
//! mutex so a single transport can be shared by reference across threads.
//! There is no reconnect, retry or pooling.
//!
//! A round trip that fails partway (timeout, short read, write error) leaves
//! an unknown amount of the reply on the socket. The connection is shut down
//! at that point and every later call fails with `TransportError::Closed`;
//! callers reconnect by building a new transport.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::TransportError;
use crate::transport::Transport;

use super::frame::{read_frame, write_request};

/// Buffered halves of the stream
struct Stream {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Set once a round trip fails; the stream is out of sync from then on
    broken: bool,
}

impl Stream {
    fn round_trip(
        &mut self,
        command: &str,
        args: &[String],
        max_frame_size: usize,
    ) -> Result<Option<Vec<String>>, TransportError> {
        write_request(&mut self.writer, command, args)?;
        read_frame(&mut self.reader, max_frame_size)
    }

    fn close(&mut self) {
        self.broken = true;
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }
}

/// Blocking TCP transport
pub struct TcpTransport {
    stream: Mutex<Stream>,

    /// Peer address for logging
    peer_addr: String,

    /// Largest block accepted from the peer
    max_frame_size: usize,
}

impl TcpTransport {
    /// Connect to `config.server_addr` and apply the configured timeouts
    pub fn connect(config: &Config) -> Result<Self, TransportError> {
        let stream = if config.connect_timeout_ms > 0 {
            let timeout = Duration::from_millis(config.connect_timeout_ms);
            let mut last_err = None;
            let mut connected = None;
            for addr in config.server_addr.to_socket_addrs()? {
                match TcpStream::connect_timeout(&addr, timeout) {
                    Ok(stream) => {
                        connected = Some(stream);
                        break;
                    }
                    Err(e) => last_err = Some(e),
                }
            }
            match (connected, last_err) {
                (Some(stream), _) => stream,
                (None, Some(e)) => return Err(e.into()),
                (None, None) => {
                    return Err(TransportError::Protocol(format!(
                        "No address resolved for {}",
                        config.server_addr
                    )))
                }
            }
        } else {
            TcpStream::connect(&config.server_addr)?
        };

        Self::from_stream(stream, config)
    }

    /// Wrap an already connected stream
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self, TransportError> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let read_stream = stream.try_clone()?;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            stream: Mutex::new(Stream {
                reader: BufReader::new(read_stream),
                writer: BufWriter::new(stream),
                broken: false,
            }),
            peer_addr,
            max_frame_size: config.max_frame_size,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Whether the connection was shut down after a failed round trip
    pub fn is_closed(&self) -> bool {
        self.stream.lock().broken
    }
}

impl Transport for TcpTransport {
    fn execute(&self, command: &str, args: &[String]) -> Result<Vec<String>, TransportError> {
        let mut stream = self.stream.lock();
        if stream.broken {
            return Err(TransportError::Closed);
        }

        match stream.round_trip(command, args, self.max_frame_size) {
            Ok(Some(tokens)) => Ok(tokens),
            Ok(None) => {
                tracing::debug!("{} closed the connection", self.peer_addr);
                stream.close();
                Err(TransportError::Closed)
            }
            Err(e) => {
                tracing::warn!("Round trip to {} failed, closing: {}", self.peer_addr, e);
                stream.close();
                Err(e)
            }
        }
    }
}
