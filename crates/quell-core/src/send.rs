//! The packet send boundary.
//!
//! Protection produces finished packet bytes; something still has to
//! put them on the wire. [`Sender`] is that seam: a bounded, closable
//! queue in front of a transport. Callers stay sans-IO by sealing into
//! a [`PacketBuffer`] and handing it over, while one task drives the
//! queue with [`Sender::run`].
//!
//! # Implementations
//!
//! - **UDP socket** (production): queue in front of a non-blocking
//!   socket
//! - **Channel double** (testing): in-memory queue the tests drain and
//!   inspect

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// An assembled, fully protected packet ready for the wire.
///
/// The contents are opaque to the sender: header protection and
/// sealing have already happened, so transmitting these bytes verbatim
/// is all that remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketBuffer {
    bytes: Bytes,
}

impl PacketBuffer {
    /// Wrap finished packet bytes.
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Packet size on the wire in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the packet is empty. An empty buffer is never a valid
    /// packet; senders may refuse it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Unwrap into the underlying bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl From<Vec<u8>> for PacketBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes: Bytes::from(bytes) }
    }
}

/// Errors from queueing or transmitting packets
#[derive(Debug, Error)]
pub enum SendError {
    /// The queue is at capacity; wait on [`Sender::available`]
    #[error("send queue is full")]
    QueueFull,

    /// The sender was closed and accepts no further packets
    #[error("sender is closed")]
    Closed,

    /// The underlying transport failed
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// A bounded, closable packet queue in front of a transport.
///
/// One task calls [`Sender::run`] to drive queued packets to the wire;
/// any number of tasks queue packets with [`Sender::send`], using
/// [`Sender::available`] and [`Sender::would_block`] to cooperate with
/// backpressure instead of dropping packets.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Wait until the queue can accept at least one packet.
    ///
    /// # Behavior
    ///
    /// - **Returns immediately** if space is free or the sender is
    ///   closed, so callers never hang on a dead sender
    /// - **Wakes** when the running task drains a slot
    /// - **No reservation**: a woken caller races other senders and
    ///   must still handle `QueueFull`
    async fn available(&self);

    /// Whether [`Sender::send`] would currently be refused for lack of
    /// queue space.
    ///
    /// A snapshot, not a promise: the queue may fill or drain between
    /// this call and the send.
    fn would_block(&self) -> bool;

    /// Queue one packet for transmission without waiting.
    ///
    /// # Behavior
    ///
    /// - **Never blocks**: full queues are reported, not waited out
    /// - **Ordering**: packets reach the wire in the order accepted
    ///
    /// # Errors
    ///
    /// - `SendError::QueueFull` if the queue is at capacity
    /// - `SendError::Closed` if the sender was closed
    fn send(&self, packet: PacketBuffer) -> Result<(), SendError>;

    /// Drive queued packets to the wire until the sender closes.
    ///
    /// # Behavior
    ///
    /// - **Drains** packets already accepted before returning, so a
    ///   close never strands queued packets
    /// - **Returns** `Ok(())` after a clean close
    ///
    /// # Errors
    ///
    /// - `SendError::Io` if the underlying transport fails; queued
    ///   packets past the failure are dropped
    async fn run(&self) -> Result<(), SendError>;

    /// Stop accepting packets and wake every waiting task.
    ///
    /// Idempotent. Packets already queued are still transmitted by
    /// [`Sender::run`]; subsequent [`Sender::send`] calls fail with
    /// `SendError::Closed`.
    fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_buffer_reports_wire_size() {
        let packet = PacketBuffer::from(vec![0u8; 1200]);
        assert_eq!(packet.len(), 1200);
        assert!(!packet.is_empty());
    }

    #[test]
    fn packet_buffer_round_trips_bytes() {
        let packet = PacketBuffer::new(Bytes::from_static(b"datagram"));
        assert_eq!(packet.as_bytes(), b"datagram");
        assert_eq!(packet.into_bytes(), Bytes::from_static(b"datagram"));
    }

    #[test]
    fn send_error_display() {
        assert_eq!(SendError::QueueFull.to_string(), "send queue is full");
        assert_eq!(SendError::Closed.to_string(), "sender is closed");
    }
}
