//! End-to-end exercise of the send pipeline
//!
//! Seals a client Initial with real keys, queues it through a
//! channel-backed [`Sender`], and opens it on the server side of the
//! in-memory wire. The double also pins the queueing contract:
//! backpressure, close semantics, and drain-on-close.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use bytes::Bytes;
use quell_core::{PacketBuffer, SendError, Sender};
use quell_crypto::{TAG_LEN, initial_protection};
use quell_proto::{ConnectionId, InitialHeader, PacketNumber, Side, Version};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, Notify, mpsc};

/// Channel-backed sender double: a bounded queue in front of an
/// in-memory wire the tests can inspect.
struct ChannelSender {
    tx: mpsc::Sender<PacketBuffer>,
    rx: Mutex<mpsc::Receiver<PacketBuffer>>,
    wire: StdMutex<Vec<PacketBuffer>>,
    closed: AtomicBool,
    closed_notify: Notify,
}

impl ChannelSender {
    fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            wire: StdMutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            closed_notify: Notify::new(),
        }
    }

    fn transmit(&self, packet: PacketBuffer) {
        self.wire.lock().unwrap().push(packet);
    }

    fn transmitted(&self) -> Vec<PacketBuffer> {
        self.wire.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sender for ChannelSender {
    async fn available(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        tokio::select! {
            permit = self.tx.reserve() => drop(permit),
            () = self.closed_notify.notified() => {}
        }
    }

    fn would_block(&self) -> bool {
        self.tx.capacity() == 0
    }

    fn send(&self, packet: PacketBuffer) -> Result<(), SendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SendError::Closed);
        }
        self.tx.try_send(packet).map_err(|err| match err {
            TrySendError::Full(_) => SendError::QueueFull,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }

    async fn run(&self) -> Result<(), SendError> {
        let mut rx = self.rx.lock().await;
        loop {
            if self.closed.load(Ordering::Acquire) {
                // drain what was accepted before the close
                while let Ok(packet) = rx.try_recv() {
                    self.transmit(packet);
                }
                return Ok(());
            }
            tokio::select! {
                packet = rx.recv() => match packet {
                    Some(packet) => self.transmit(packet),
                    None => return Ok(()),
                },
                () = self.closed_notify.notified() => {}
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.closed_notify.notify_waiters();
    }
}

#[tokio::test]
async fn initial_packets_flow_end_to_end() {
    let dcid = ConnectionId::new(&[0x83, 0x94, 0xc8, 0xf0, 0x3e, 0x51, 0x57, 0x08]).unwrap();
    let (sealer, _) = initial_protection(Version::V1, &dcid, Side::Client).unwrap();
    let (_, opener) = initial_protection(Version::V1, &dcid, Side::Server).unwrap();

    let payload = b"ClientHello carried in a CRYPTO frame";
    let pn = PacketNumber::new(0).unwrap();
    let pn_len = pn.encoded_len(None);
    let header = InitialHeader {
        version: Version::V1,
        dcid,
        scid: ConnectionId::new(&[0xf0, 0x67, 0xa5, 0x50, 0x2a, 0x42, 0x62, 0xb5]).unwrap(),
        token: Bytes::new(),
        length: (pn_len.bytes() + payload.len() + TAG_LEN) as u64,
    };
    let encoded = header.encode(pn, pn_len).unwrap();
    let packet = sealer.seal_packet(&encoded, pn, payload).unwrap();

    let sender = Arc::new(ChannelSender::with_capacity(4));
    let runner = {
        let sender = Arc::clone(&sender);
        tokio::spawn(async move { sender.run().await })
    };

    sender.send(PacketBuffer::from(packet)).unwrap();
    tokio::task::yield_now().await;
    sender.close();
    runner.await.unwrap().unwrap();

    let transmitted = sender.transmitted();
    assert_eq!(transmitted.len(), 1, "exactly one datagram on the wire");

    let mut received = transmitted[0].as_bytes().to_vec();
    let (parsed, pn_offset) = InitialHeader::parse(&received).unwrap();
    assert_eq!(parsed, header, "cleartext header fields must survive the wire");

    let (opened_pn, opened) = opener.open_packet(&mut received, pn_offset, None).unwrap();
    assert_eq!(opened_pn, pn);
    assert_eq!(opened, payload);
}

#[tokio::test]
async fn send_refuses_past_capacity() {
    let sender = ChannelSender::with_capacity(1);
    assert!(!sender.would_block());

    sender.send(PacketBuffer::from(vec![1])).unwrap();
    assert!(sender.would_block());

    let result = sender.send(PacketBuffer::from(vec![2]));
    assert!(matches!(result, Err(SendError::QueueFull)));
}

#[tokio::test]
async fn available_waits_for_the_runner_to_drain() {
    let sender = Arc::new(ChannelSender::with_capacity(1));
    sender.send(PacketBuffer::from(vec![1])).unwrap();
    assert!(sender.would_block());

    let runner = {
        let sender = Arc::clone(&sender);
        tokio::spawn(async move { sender.run().await })
    };

    sender.available().await;
    assert!(!sender.would_block());
    sender.send(PacketBuffer::from(vec![2])).unwrap();

    sender.close();
    runner.await.unwrap().unwrap();
    assert_eq!(sender.transmitted().len(), 2);
}

#[tokio::test]
async fn closed_sender_refuses_and_never_blocks() {
    let sender = ChannelSender::with_capacity(1);
    sender.close();

    let result = sender.send(PacketBuffer::from(vec![1]));
    assert!(matches!(result, Err(SendError::Closed)));

    // must return at once rather than wait for a slot
    sender.available().await;
}

#[tokio::test]
async fn close_does_not_strand_queued_packets() {
    let sender = Arc::new(ChannelSender::with_capacity(4));
    sender.send(PacketBuffer::from(vec![1])).unwrap();
    sender.send(PacketBuffer::from(vec![2])).unwrap();
    sender.close();

    // run starts only after the close and must still drain the queue
    sender.run().await.unwrap();

    let transmitted = sender.transmitted();
    assert_eq!(transmitted.len(), 2);
    assert_eq!(transmitted[0].as_bytes(), &[1]);
    assert_eq!(transmitted[1].as_bytes(), &[2]);
}
