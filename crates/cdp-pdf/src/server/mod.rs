//! DevTools connection layer (internal)
//!
//! This module handles the WebSocket transport, JSON-RPC correlation of
//! commands and responses, and routing of protocol events to listeners.
//!
//! **Note**: This module is exposed publicly only for integration testing purposes.
//! The types and APIs in this module are considered internal implementation details
//! and may change without notice. User code should not depend on these types directly.

#[doc(hidden)]
pub mod channel;
#[doc(hidden)]
pub mod connection;
#[doc(hidden)]
pub mod events;
#[doc(hidden)]
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
