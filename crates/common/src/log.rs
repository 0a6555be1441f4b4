//! Event log shared by the engines
//!
//! Each engine records one event per committed state transition. The log
//! assigns the sequence number, so events are totally ordered per engine.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// An event stamped with its position in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequenced<E> {
    /// Sequence number (starts at 1)
    pub sequence: u64,
    /// Unix timestamp at which the transition committed
    pub timestamp: i64,
    /// The event itself
    #[serde(flatten)]
    pub event: E,
}

/// In-memory event log
#[derive(Debug)]
pub struct EventLog<E> {
    /// Events stored in sequence order
    events: Vec<Sequenced<E>>,
    /// Last assigned sequence number
    sequence: u64,
}

impl<E: Clone> EventLog<E> {
    /// Create a new event log
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            sequence: 0,
        }
    }

    /// Append an event, returning its sequence number
    pub fn append(&mut self, timestamp: i64, event: E) -> u64 {
        self.sequence += 1;
        self.events.push(Sequenced {
            sequence: self.sequence,
            timestamp,
            event,
        });
        debug!(sequence = self.sequence, "Event appended to log");
        self.sequence
    }

    /// Get events from a sequence number onwards
    pub fn get_from(&self, from_sequence: u64) -> Vec<Sequenced<E>> {
        self.events
            .iter()
            .filter(|e| e.sequence >= from_sequence)
            .cloned()
            .collect()
    }

    /// Get current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Get total number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<E: Clone> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_increasing_sequences() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.append(10, "a"), 1);
        assert_eq!(log.append(11, "b"), 2);
        assert_eq!(log.sequence(), 2);
        assert_eq!(log.len(), 2);

        let tail = log.get_from(2);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].event, "b");
        assert_eq!(tail[0].timestamp, 11);
    }
}
