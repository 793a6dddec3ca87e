//! # zset-client
//!
//! A typed client for the sorted-set ("ZSet") commands of a line-oriented
//! key-value store:
//! - One method per command, one round trip per call
//! - Status classification into typed errors
//! - Pair decoding with configurable score coercion
//! - Pluggable transport (blocking TCP or in-memory)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ZSetClient (façade)                       │
//! │         validate → encode → execute → classify → decode      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Transport::execute(name, args)
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │TcpTransport │          │  MemStore   │
//!   │  (framing)  │          │  (RwLock)   │
//!   └──────┬──────┘          └──────▲──────┘
//!          │                        │
//!          ▼                        │
//!   ┌─────────────┐          ┌──────┴──────┐
//!   │ remote store│    or    │   Server    │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use zset_client::{Bound, MemStore, ZSetClient};
//!
//! let client = ZSetClient::new(MemStore::new());
//! client.zset("scores", "a", 10)?;
//! client.zset("scores", "b", 10)?;
//! client.zset("scores", "c", 20)?;
//!
//! let page = client.zscan("scores", "a", 10, 20, 10)?;
//! assert_eq!(page.len(), 2);
//! assert_eq!(client.zcount("scores", Bound::Unbounded, 15)?, 2);
//! # Ok::<(), zset_client::ZSetError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transport;
pub mod client;
pub mod memtable;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DecodeError, Result, TransportError, ZSetError};
pub use config::{Config, ScoreDecoding};
pub use client::ZSetClient;
pub use memtable::MemStore;
pub use network::TcpTransport;
pub use protocol::{Bound, Member, StatusKind};
pub use transport::Transport;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of zset-client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
