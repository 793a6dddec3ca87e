//! Protocol Module
//!
//! Defines the command/reply contract with the sorted-set store.
//!
//! ## Request Format
//! ```text
//! ┌──────────┬──────────┬──────────┬─────┐
//! │ command  │  arg 1   │  arg 2   │ ... │   every token is text
//! └──────────┴──────────┴──────────┴─────┘
//! ```
//!
//! ## Response Format
//! ```text
//! ┌──────────┬──────────┬──────────┬─────┐
//! │  status  │ token 1  │ token 2  │ ... │
//! └──────────┴──────────┴──────────┴─────┘
//! ```
//!
//! ### Status Tokens
//! - `ok`: payload follows
//! - `not_found`: key or set does not exist
//! - `error`: store-side failure
//! - `fail`: command failed (also used for empty or unrecognized statuses)
//! - `client_error`: malformed request

mod command;
mod response;
mod codec;
mod range;

pub use command::{Bound, Command, CommandType};
pub use response::{classify, Member, Outcome, Response, StatusKind};
pub use codec::{
    decode_average, decode_columns, decode_command, decode_flag, decode_int, decode_pair_map,
    decode_pairs, encode_command, parse_score,
};
pub use range::{Direction, ScanRange, ScoreInterval};
