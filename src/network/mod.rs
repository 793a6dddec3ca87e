//! Network Module
//!
//! TCP transport and development server.
//!
//! ## Architecture
//! - `TcpTransport`: one blocking client connection, round trips serialized
//! - `Server`: single acceptor thread, one thread per connection, commands
//!   routed to a shared `MemStore`

mod frame;
mod server;
mod connection;

pub use frame::{encode_frame, read_frame, write_frame, write_request};
pub use server::Server;
pub use connection::TcpTransport;
