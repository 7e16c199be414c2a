//! evsource - A streaming event client over long-lived HTTP responses
//!
//! Opens an authenticated GET request whose body is a `data: `-framed
//! event stream, incrementally decodes it (UTF-8 chunks, line framing,
//! JSON payloads), and dispatches each event to registered listeners.
//! Connection lifecycle is observable through a watch channel.

pub mod adapters;
pub mod client;
pub mod decode;
pub mod frame;
pub mod framing;
pub mod registry;
pub mod traits;

pub use client::{ConnectionStatus, StreamClient, StreamPhase};
pub use frame::EventRecord;
