//! One-shot timers on a monotonic timeline.
//!
//! Nothing fires on its own: the owner polls [`Scheduler::pop_due`] with the
//! current clock reading and handles whatever comes out. Cancelling removes
//! the entry, so a cancelled timer can never be observed afterwards.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<K> {
    id: TimerId,
    due: Duration,
    kind: K,
}

/// Pending one-shot timers. Entries due at the same instant pop in `K`
/// order, then in scheduling order.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    entries: Vec<Entry<K>>,
    next_id: u64,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K: Ord + Clone> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, due, kind });
        id
    }

    /// Returns `false` if the timer already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn due_at(&self, id: TimerId) -> Option<Duration> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.due)
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Remove and return the earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, K)> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by(|(_, a), (_, b)| {
                (a.due, &a.kind, a.id.0).cmp(&(b.due, &b.kind, b.id.0))
            })
            .map(|(pos, _)| pos)?;
        let entry = self.entries.remove(pos);
        Some((entry.id, entry.kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_nothing_fires_early() {
        let mut timers = Scheduler::new();
        timers.schedule(ms(100), 'a');
        assert_eq!(timers.pop_due(ms(99)), None);
        assert!(matches!(timers.pop_due(ms(100)), Some((_, 'a'))));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = Scheduler::new();
        timers.schedule(ms(300), 3);
        timers.schedule(ms(100), 1);
        timers.schedule(ms(200), 2);
        let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(ms(1000)))
            .map(|(_, k)| k)
            .collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_break_on_kind() {
        let mut timers = Scheduler::new();
        timers.schedule(ms(50), 9);
        timers.schedule(ms(50), 4);
        assert_eq!(timers.pop_due(ms(50)).map(|(_, k)| k), Some(4));
        assert_eq!(timers.pop_due(ms(50)).map(|(_, k)| k), Some(9));
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timers = Scheduler::new();
        let id = timers.schedule(ms(10), "x");
        assert!(timers.is_pending(id));
        assert_eq!(timers.due_at(id), Some(ms(10)));
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.pop_due(ms(1_000)), None);
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = Scheduler::new();
        timers.schedule(ms(1), 1);
        timers.schedule(ms(2), 2);
        assert_eq!(timers.len(), 2);
        assert_eq!(timers.next_due(), Some(ms(1)));
        timers.cancel_all();
        assert_eq!(timers.next_due(), None);
        assert_eq!(timers.pop_due(ms(10)), None);
    }
}
