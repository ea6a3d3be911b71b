//! Bounded FIFO of utterances with a single "active" slot.
//!
//! At most one utterance is active at a time: [`dequeue`](UtteranceQueue::dequeue)
//! refuses to hand out the next item until [`finish`](UtteranceQueue::finish)
//! has released the current one.
//!
//! # Example
//!
//! ```rust
//! use speak_eval::playback::UtteranceQueue;
//!
//! let mut queue = UtteranceQueue::new(4);
//! queue.enqueue("Hello!".into()).unwrap();
//! queue.enqueue("Please introduce yourself.".into()).unwrap();
//!
//! assert_eq!(queue.dequeue().as_deref(), Some("Hello!"));
//! assert!(queue.dequeue().is_none()); // still busy
//! queue.finish();
//! assert_eq!(queue.dequeue().as_deref(), Some("Please introduce yourself."));
//! ```

use std::collections::VecDeque;

use thiserror::Error;

/// Returned by [`UtteranceQueue::enqueue`] when `capacity` items are already
/// waiting. The rejected text is handed back.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("playback queue is full ({capacity} utterances waiting)")]
pub struct QueueFull {
    pub capacity: usize,
    pub text: String,
}

/// FIFO of pending utterances plus the one currently playing.
#[derive(Debug)]
pub struct UtteranceQueue {
    pending: VecDeque<String>,
    capacity: usize,
    active: Option<String>,
}

impl UtteranceQueue {
    /// Create a queue holding up to `capacity` waiting utterances (at least
    /// one). The active utterance does not count against the capacity.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity,
            active: None,
        }
    }

    /// Append `text` behind everything already waiting.
    pub fn enqueue(&mut self, text: String) -> Result<(), QueueFull> {
        if self.pending.len() >= self.capacity {
            return Err(QueueFull {
                capacity: self.capacity,
                text,
            });
        }
        self.pending.push_back(text);
        Ok(())
    }

    /// Promote the oldest waiting utterance to active and return it.
    ///
    /// Returns `None` while another utterance is active or nothing waits.
    pub fn dequeue(&mut self) -> Option<String> {
        if self.active.is_some() {
            return None;
        }
        let next = self.pending.pop_front()?;
        self.active = Some(next.clone());
        Some(next)
    }

    /// Release the active slot, returning what was playing.
    pub fn finish(&mut self) -> Option<String> {
        self.active.take()
    }

    /// `true` when nothing is playing.
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Number of utterances waiting behind the active one.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
