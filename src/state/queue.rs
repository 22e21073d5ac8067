//! Matchmaking queue.
//!
//! Waiting participants are held in arrival order and paired FIFO: as soon as
//! two distinct participants are present, the front two are removed and handed
//! back as a pairing. There is no timeout; a participant waits until paired or
//! disconnected.

use std::collections::VecDeque;

use crate::state::ParticipantId;

/// FIFO queue of participants waiting for an opponent.
#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: VecDeque<ParticipantId>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a participant. No-op if already waiting.
    ///
    /// Returns the pairing formed by this call, if any, in arrival order.
    pub fn enqueue(&mut self, participant: ParticipantId) -> Option<(ParticipantId, ParticipantId)> {
        if !self.waiting.contains(&participant) {
            self.waiting.push_back(participant);
        }

        if self.waiting.len() >= 2 {
            let first = self.waiting.pop_front()?;
            let second = self.waiting.pop_front()?;
            Some((first, second))
        } else {
            None
        }
    }

    /// Remove a waiting participant (disconnect while queued). No-op if not
    /// present.
    pub fn remove(&mut self, participant: ParticipantId) -> bool {
        match self.waiting.iter().position(|p| *p == participant) {
            Some(idx) => {
                self.waiting.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Check if a participant is waiting.
    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.waiting.contains(&participant)
    }

    /// Count of waiting participants.
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_enqueue_waits() {
        let mut queue = MatchQueue::new();

        assert_eq!(queue.enqueue(1), None);
        assert!(queue.contains(1));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pairs_in_arrival_order() {
        let mut queue = MatchQueue::new();

        assert_eq!(queue.enqueue(1), None);
        assert_eq!(queue.enqueue(2), Some((1, 2)));
        assert!(queue.is_empty());

        // Next arrivals pair among themselves
        assert_eq!(queue.enqueue(3), None);
        assert_eq!(queue.enqueue(4), Some((3, 4)));
    }

    #[test]
    fn test_enqueue_idempotent() {
        let mut queue = MatchQueue::new();

        assert_eq!(queue.enqueue(1), None);
        // Re-queueing the same participant never pairs them with themselves
        assert_eq!(queue.enqueue(1), None);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.enqueue(2), Some((1, 2)));
    }

    #[test]
    fn test_remove_waiting() {
        let mut queue = MatchQueue::new();

        queue.enqueue(1);
        assert!(queue.remove(1));
        assert!(!queue.contains(1));
        assert!(!queue.remove(1));

        // 2 now waits alone
        assert_eq!(queue.enqueue(2), None);
        assert_eq!(queue.enqueue(3), Some((2, 3)));
    }
}
