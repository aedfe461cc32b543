//! The pending-event queue.
//!
//! Index 0 is the bottom, the last element the top. Draining always works
//! on the top, so the most recently queued event goes first.

use crate::core::EventId;

/// Ordered set of queued, not yet terminal events.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    entries: Vec<EventId>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an event on top.
    pub fn push(&mut self, event: EventId) {
        self.entries.push(event);
    }

    /// Put an event directly above `after`.
    ///
    /// If `after` is not queued the event goes to the bottom.
    pub fn insert_after(&mut self, event: EventId, after: EventId) {
        let at = self
            .entries
            .iter()
            .position(|queued| *queued == after)
            .map_or(0, |i| i + 1);
        self.entries.insert(at, event);
    }

    /// The next event to work on.
    #[must_use]
    pub fn top(&self) -> Option<EventId> {
        self.entries.last().copied()
    }

    /// Remove an event wherever it is. Returns whether it was queued.
    pub fn remove(&mut self, event: EventId) -> bool {
        match self.entries.iter().rposition(|queued| *queued == event) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, event: EventId) -> bool {
        self.entries.contains(&event)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued events, bottom first.
    #[must_use]
    pub fn as_slice(&self) -> &[EventId] {
        &self.entries
    }

    /// Empty the queue, returning what was in it (bottom first).
    pub fn take_all(&mut self) -> Vec<EventId> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_is_last_pushed() {
        let mut queue = EventQueue::new();
        queue.push(EventId(1));
        queue.push(EventId(2));

        assert_eq!(queue.top(), Some(EventId(2)));
        assert!(queue.remove(EventId(2)));
        assert_eq!(queue.top(), Some(EventId(1)));
    }

    #[test]
    fn test_insert_after() {
        let mut queue = EventQueue::new();
        queue.push(EventId(1));
        queue.push(EventId(2));
        queue.insert_after(EventId(3), EventId(1));

        assert_eq!(queue.as_slice(), &[EventId(1), EventId(3), EventId(2)]);
    }

    #[test]
    fn test_insert_after_missing_goes_to_bottom() {
        let mut queue = EventQueue::new();
        queue.push(EventId(1));
        queue.insert_after(EventId(5), EventId(9));

        assert_eq!(queue.as_slice(), &[EventId(5), EventId(1)]);
        assert_eq!(queue.top(), Some(EventId(1)));
    }

    #[test]
    fn test_remove_missing() {
        let mut queue = EventQueue::new();
        assert!(!queue.remove(EventId(0)));
        assert!(queue.is_empty());
    }
}
