//! # Receiver Module
//!
//! Boundary between the radio link and the pipeline.
//!
//! This module handles:
//! - The `PacketReceiver` contract the pipeline drains
//! - A bounded FIFO queue with a "packets available" notification
//! - Reading framed radio payloads from the USB serial bridge

pub mod serial;

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use tracing::warn;

use crate::error::{Result, SmokerBridgeError};

/// Source of raw radio payloads, consumed in FIFO order
pub trait PacketReceiver {
    /// Take the next buffered payload, or `None` when nothing is pending
    fn next_packet(&mut self) -> Option<Bytes>;
}

impl PacketReceiver for VecDeque<Bytes> {
    fn next_packet(&mut self) -> Option<Bytes> {
        self.pop_front()
    }
}

/// Create a bounded packet queue
///
/// # Arguments
///
/// * `capacity` - Maximum number of pending payloads
///
/// # Returns
///
/// * `(PacketSender, QueueReceiver)` - Producer half for the link reader, consumer half for the pipeline
pub fn packet_queue(capacity: usize) -> (PacketSender, QueueReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let notify = Arc::new(Notify::new());

    (
        PacketSender { tx, notify: Arc::clone(&notify) },
        QueueReceiver { rx, notify },
    )
}

/// Producer half of the packet queue
#[derive(Debug, Clone)]
pub struct PacketSender {
    tx: mpsc::Sender<Bytes>,
    notify: Arc<Notify>,
}

impl PacketSender {
    /// Enqueue a payload and signal that packets are available
    ///
    /// A full queue drops the payload (logged) and still signals, so the
    /// consumer drains what is already pending.
    ///
    /// # Errors
    ///
    /// Returns error if the consumer half has been dropped
    pub fn push(&self, payload: Bytes) -> Result<()> {
        match self.tx.try_send(payload) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!("Packet queue full, dropping {} byte payload", dropped.len());
            }
            Err(TrySendError::Closed(_)) => {
                return Err(SmokerBridgeError::Serial("packet queue closed".to_string()));
            }
        }

        self.notify.notify_one();
        Ok(())
    }
}

/// Consumer half of the packet queue
#[derive(Debug)]
pub struct QueueReceiver {
    rx: mpsc::Receiver<Bytes>,
    notify: Arc<Notify>,
}

impl QueueReceiver {
    /// Handle that is notified whenever payloads are pushed
    pub fn notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.notify)
    }
}

impl PacketReceiver for QueueReceiver {
    fn next_packet(&mut self) -> Option<Bytes> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_queue_is_fifo() {
        let (sender, mut receiver) = packet_queue(8);
        sender.push(Bytes::from_static(&[1])).unwrap();
        sender.push(Bytes::from_static(&[2])).unwrap();
        sender.push(Bytes::from_static(&[3])).unwrap();

        assert_eq!(receiver.next_packet().unwrap(), Bytes::from_static(&[1]));
        assert_eq!(receiver.next_packet().unwrap(), Bytes::from_static(&[2]));
        assert_eq!(receiver.next_packet().unwrap(), Bytes::from_static(&[3]));
        assert!(receiver.next_packet().is_none());
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let (sender, mut receiver) = packet_queue(2);
        sender.push(Bytes::from_static(&[1])).unwrap();
        sender.push(Bytes::from_static(&[2])).unwrap();
        assert!(sender.push(Bytes::from_static(&[3])).is_ok());

        assert_eq!(receiver.next_packet().unwrap(), Bytes::from_static(&[1]));
        assert_eq!(receiver.next_packet().unwrap(), Bytes::from_static(&[2]));
        assert!(receiver.next_packet().is_none());
    }

    #[test]
    fn test_push_after_receiver_dropped() {
        let (sender, receiver) = packet_queue(2);
        drop(receiver);

        match sender.push(Bytes::from_static(&[1])) {
            Err(SmokerBridgeError::Serial(msg)) => assert!(msg.contains("closed")),
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_push_notifies_consumer() {
        let (sender, receiver) = packet_queue(4);
        let notify = receiver.notifier();

        sender.push(Bytes::from_static(&[0xAB])).unwrap();

        // Permit is stored even though nobody was waiting yet
        tokio::time::timeout(Duration::from_secs(1), notify.notified())
            .await
            .expect("consumer should be notified");
    }

    #[test]
    fn test_vec_deque_receiver() {
        let mut queue: VecDeque<Bytes> = VecDeque::new();
        queue.push_back(Bytes::from_static(b"a"));
        queue.push_back(Bytes::from_static(b"b"));

        assert_eq!(queue.next_packet().unwrap(), Bytes::from_static(b"a"));
        assert_eq!(queue.next_packet().unwrap(), Bytes::from_static(b"b"));
        assert_eq!(queue.next_packet(), None);
    }
}
