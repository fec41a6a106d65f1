//! Hand-off from the reader thread to the render loop
//!
//! Unbounded in both directions: the producer never waits for the consumer
//! and the consumer never waits for the producer.

use crossbeam::channel::{unbounded, Receiver, Sender, TrySendError};

/// Producer side
#[derive(Debug, Clone)]
pub struct FrameSender<T> {
    tx: Sender<T>,
}

/// Consumer side
#[derive(Debug)]
pub struct FrameReceiver<T> {
    rx: Receiver<T>,
}

/// What one drain pass found
#[derive(Debug)]
pub struct Drained<T> {
    /// Last frame in arrival order
    pub latest: T,
    /// Frames taken in this pass, the latest included
    pub count: usize,
}

/// Create a connected pair
pub fn frame_queue<T>() -> (FrameSender<T>, FrameReceiver<T>) {
    let (tx, rx) = unbounded();
    (FrameSender { tx }, FrameReceiver { rx })
}

impl<T> FrameSender<T> {
    /// Enqueue a frame. Returns false once the consumer is gone.
    pub fn push(&self, frame: T) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Disconnected(_)) => false,
            // An unbounded channel is never full
            Err(TrySendError::Full(_)) => true,
        }
    }
}

impl<T> FrameReceiver<T> {
    /// Take everything currently queued and keep only the newest frame.
    pub fn drain_latest(&self) -> Option<Drained<T>> {
        let mut latest = None;
        let mut count = 0;
        for frame in self.rx.try_iter() {
            latest = Some(frame);
            count += 1;
        }
        latest.map(|latest| Drained { latest, count })
    }

    /// Frames waiting
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_keeps_only_latest() {
        let (tx, rx) = frame_queue();
        tx.push("F1");
        tx.push("F2");
        tx.push("F3");

        let drained = rx.drain_latest().unwrap();
        assert_eq!(drained.latest, "F3");
        assert_eq!(drained.count, 3);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_empty_drain_is_none() {
        let (_tx, rx) = frame_queue::<u8>();
        assert!(rx.drain_latest().is_none());
    }

    #[test]
    fn test_push_after_consumer_dropped() {
        let (tx, rx) = frame_queue();
        drop(rx);
        assert!(!tx.push(1u8));
    }

    #[test]
    fn test_concurrent_producer_preserves_order() {
        let (tx, rx) = frame_queue();
        let producer = thread::spawn(move || {
            for i in 0..10_000u32 {
                tx.push(i);
            }
        });
        producer.join().unwrap();

        assert_eq!(rx.len(), 10_000);
        let mut last = None;
        while let Ok(v) = rx.rx.try_recv() {
            if let Some(prev) = last {
                assert_eq!(v, prev + 1);
            }
            last = Some(v);
        }
        assert_eq!(last, Some(9_999));
    }
}
