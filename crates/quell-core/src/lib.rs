//! Quell Core
//!
//! Transport-facing contracts shared by Quell endpoints. The crypto and
//! wire layers are sans-IO by design; this crate defines the seam where
//! finished packets meet an actual transport, so endpoint logic can be
//! tested against in-memory doubles and deployed against sockets
//! without changing shape.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod send;

pub use send::{PacketBuffer, SendError, Sender};
