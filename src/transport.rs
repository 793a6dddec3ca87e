//! Transport capability
//!
//! The single round trip the client depends on. Connection lifecycle,
//! framing and thread safety belong to the implementor.

use std::sync::Arc;

use crate::error::TransportError;

/// One request in, one reply out
///
/// Returns the raw reply tokens, status first. An `Err` means the round trip
/// itself failed; a non-`ok` status is a successful round trip.
pub trait Transport {
    fn execute(&self, command: &str, args: &[String]) -> Result<Vec<String>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, command: &str, args: &[String]) -> Result<Vec<String>, TransportError> {
        (**self).execute(command, args)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, command: &str, args: &[String]) -> Result<Vec<String>, TransportError> {
        (**self).execute(command, args)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, command: &str, args: &[String]) -> Result<Vec<String>, TransportError> {
        (**self).execute(command, args)
    }
}
