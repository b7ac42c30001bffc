//! In-memory loopback transport, primarily useful for tests.
use std::collections::VecDeque;
use std::time::Duration;

use super::Interface;
use crate::error::TransportResult;

const DEFAULT_QUEUE_LIMIT: usize = 1024;
const DEFAULT_MTU: usize = 1024;

/// A bounded FIFO admission queue with drop-oldest overflow handling.
///
/// `recv` pops the most recently enqueued frame rather than the oldest —
/// LIFO order. This is a source quirk preserved intentionally: it appears
/// to have been written for testing convenience (the last frame you sent is
/// the first one you get back) and is inconsistent with the FIFO ordering
/// every other transport in this module provides. Do not "fix" it.
pub struct Loopback {
    name: String,
    queue: VecDeque<Vec<u8>>,
    queue_limit: usize,
    mtu: usize,
}

impl Loopback {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: VecDeque::new(),
            queue_limit: DEFAULT_QUEUE_LIMIT,
            mtu: DEFAULT_MTU,
        }
    }

    pub fn with_queue_limit(mut self, queue_limit: usize) -> Self {
        self.queue_limit = queue_limit;
        self
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Interface for Loopback {
    fn send(&mut self, data: &[u8]) -> TransportResult<()> {
        if self.queue.len() >= self.queue_limit {
            self.queue.pop_front();
        }
        self.queue.push_back(data.to_vec());
        Ok(())
    }

    fn recv(&mut self, _timeout: Duration) -> TransportResult<Option<Vec<u8>>> {
        Ok(self.queue.pop_back())
    }

    fn mtu(&self) -> usize {
        self.mtu
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recv_is_lifo() {
        let mut iface = Loopback::new("loop0");
        iface.send(b"first").unwrap();
        iface.send(b"second").unwrap();
        assert_eq!(
            iface.recv(Duration::from_millis(0)).unwrap(),
            Some(b"second".to_vec())
        );
        assert_eq!(
            iface.recv(Duration::from_millis(0)).unwrap(),
            Some(b"first".to_vec())
        );
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut iface = Loopback::new("loop0").with_queue_limit(2);
        iface.send(b"a").unwrap();
        iface.send(b"b").unwrap();
        iface.send(b"c").unwrap();
        assert_eq!(iface.len(), 2);
        // "a" was dropped; only "b" and "c" remain, poppable LIFO.
        assert_eq!(
            iface.recv(Duration::from_millis(0)).unwrap(),
            Some(b"c".to_vec())
        );
        assert_eq!(
            iface.recv(Duration::from_millis(0)).unwrap(),
            Some(b"b".to_vec())
        );
    }

    #[test]
    fn recv_on_empty_queue_returns_none() {
        let mut iface = Loopback::new("loop0");
        assert_eq!(iface.recv(Duration::from_millis(0)).unwrap(), None);
    }
}
