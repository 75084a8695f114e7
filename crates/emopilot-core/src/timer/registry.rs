//! Timer registry implementation.
//!
//! Every delayed or repeating callback the session creates lives here, in an
//! arena-style handle table. The registry owns a virtual clock and has no
//! internal thread: the owner advances it and receives the payloads that came
//! due, one at a time.
//!
//! ## Ordering
//!
//! Firings are delivered in order of due time. Ties are broken by the order in
//! which the timers were armed (a repeating timer re-arms after each firing).
//!
//! ## Usage
//!
//! ```ignore
//! let mut timers = TimerRegistry::new();
//! let h = timers.schedule(800, Action::Reveal);
//! while let Some((handle, action)) = timers.pop_due(target_ms) {
//!     // handle `action`; may cancel or schedule more timers
//! }
//! timers.settle(target_ms);
//! ```

/// Opaque reference to a scheduled timer.
///
/// Handles carry a generation so a handle to a fired or cancelled timer never
/// aliases a newer timer that reused the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    slot: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Armed<T> {
    due_ms: u64,
    seq: u64,
    interval_ms: Option<u64>,
    payload: T,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    armed: Option<Armed<T>>,
}

/// Table of outstanding timers plus the virtual clock they run on.
#[derive(Debug, Clone)]
pub struct TimerRegistry<T> {
    now_ms: u64,
    next_seq: u64,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T: Clone> Default for TimerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TimerRegistry<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of timers that can still fire.
    pub fn pending_count(&self) -> usize {
        self.live
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.slots
            .get(handle.slot as usize)
            .map(|s| s.generation == handle.generation && s.armed.is_some())
            .unwrap_or(false)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Fire `payload` once, `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> TimerHandle {
        self.arm(delay_ms, None, payload)
    }

    /// Fire `payload` every `interval_ms` until cancelled. The first firing is
    /// one interval from now. Intervals below 1 ms are raised to 1 ms.
    pub fn schedule_repeating(&mut self, interval_ms: u64, payload: T) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        self.arm(interval_ms, Some(interval_ms), payload)
    }

    /// Cancel one timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.slot as usize) else {
            return false;
        };
        if slot.generation != handle.generation || slot.armed.is_none() {
            return false;
        }
        self.release(handle.slot);
        tracing::trace!(slot = handle.slot, "timer cancelled");
        true
    }

    /// Cancel every pending timer. Returns how many were cancelled; calling it
    /// again immediately returns 0 and changes nothing.
    pub fn cancel_all(&mut self) -> usize {
        let armed: Vec<u32> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.armed.is_some())
            .map(|(i, _)| i as u32)
            .collect();
        for slot in &armed {
            self.release(*slot);
        }
        if !armed.is_empty() {
            tracing::debug!(cancelled = armed.len(), "all timers cancelled");
        }
        armed.len()
    }

    /// Remove and return the earliest timer due at or before `until_ms`,
    /// moving the clock to its due time. Repeating timers are re-armed unless
    /// their next due time would overflow the clock.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, T)> {
        let (index, due_ms) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.armed.as_ref().map(|a| (i, a.due_ms, a.seq)))
            .filter(|(_, due, _)| *due <= until_ms)
            .min_by_key(|(_, due, seq)| (*due, *seq))
            .map(|(i, due, _)| (i, due))?;

        self.now_ms = self.now_ms.max(due_ms);
        let handle = TimerHandle {
            slot: index as u32,
            generation: self.slots[index].generation,
        };

        // A repeating timer whose next firing is past the end of the clock
        // fires this last time and retires.
        let next_due = self.slots[index]
            .armed
            .as_ref()
            .and_then(|a| a.interval_ms)
            .and_then(|interval_ms| due_ms.checked_add(interval_ms));
        match next_due {
            Some(next_due) => {
                let seq = self.bump_seq();
                let armed = self.slots[index].armed.as_mut()?;
                armed.due_ms = next_due;
                armed.seq = seq;
                Some((handle, armed.payload.clone()))
            }
            None => {
                let armed = self.slots[index].armed.take()?;
                self.retire(index as u32);
                Some((handle, armed.payload))
            }
        }
    }

    /// Move the clock forward to `now_ms` without firing anything. Call after
    /// draining [`pop_due`](Self::pop_due) for the same target.
    pub fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Advance the clock by `elapsed_ms`, returning every firing in order.
    ///
    /// Owners that mutate timers in response to a firing should drive
    /// [`pop_due`](Self::pop_due) themselves instead.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<(TimerHandle, T)> {
        let target = self.now_ms.saturating_add(elapsed_ms);
        let mut fired = Vec::new();
        while let Some(firing) = self.pop_due(target) {
            fired.push(firing);
        }
        self.settle(target);
        fired
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, delay_ms: u64, interval_ms: Option<u64>, payload: T) -> TimerHandle {
        let seq = self.bump_seq();
        let armed = Armed {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq,
            interval_ms,
            payload,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize].armed = Some(armed);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    armed: Some(armed),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.live += 1;
        tracing::trace!(slot, delay_ms, repeating = interval_ms.is_some(), "timer armed");
        TimerHandle {
            slot,
            generation: self.slots[slot as usize].generation,
        }
    }

    fn release(&mut self, slot: u32) {
        self.slots[slot as usize].armed = None;
        self.retire(slot);
    }

    fn retire(&mut self, slot: u32) {
        let entry = &mut self.slots[slot as usize];
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(slot);
        self.live -= 1;
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once_after_delay() {
        let mut timers = TimerRegistry::new();
        timers.schedule(100, "a");
        assert!(timers.advance(99).is_empty());
        let fired = timers.advance(1);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, "a");
        assert!(timers.advance(1_000).is_empty());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn repeating_fires_until_cancelled() {
        let mut timers = TimerRegistry::new();
        let h = timers.schedule_repeating(40, "tick");
        assert_eq!(timers.advance(200).len(), 5);
        assert!(timers.cancel(h));
        assert!(timers.advance(200).is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut timers = TimerRegistry::new();
        let h = timers.schedule(10, ());
        assert!(timers.cancel(h));
        assert!(!timers.cancel(h));
        assert!(!timers.is_pending(h));
    }

    #[test]
    fn cancel_after_fire_is_noop() {
        let mut timers = TimerRegistry::new();
        let h = timers.schedule(10, 1);
        timers.advance(10);
        assert!(!timers.cancel(h));
    }

    #[test]
    fn stale_handle_does_not_cancel_reused_slot() {
        let mut timers = TimerRegistry::new();
        let old = timers.schedule(10, 1);
        timers.cancel(old);
        let new = timers.schedule(10, 2);
        assert!(!timers.cancel(old));
        assert!(timers.is_pending(new));
        assert_eq!(timers.advance(10)[0].1, 2);
    }

    #[test]
    fn cancel_all_twice_matches_once() {
        let mut timers = TimerRegistry::new();
        timers.schedule(10, 1);
        timers.schedule_repeating(5, 2);
        assert_eq!(timers.cancel_all(), 2);
        let now = timers.now_ms();
        assert_eq!(timers.cancel_all(), 0);
        assert_eq!(timers.pending_count(), 0);
        assert_eq!(timers.now_ms(), now);
        assert!(timers.advance(1_000).is_empty());
    }

    #[test]
    fn ties_fire_in_registration_order() {
        let mut timers = TimerRegistry::new();
        timers.schedule(50, "first");
        timers.schedule(50, "second");
        timers.schedule(20, "earliest");
        let order: Vec<_> = timers.advance(50).into_iter().map(|(_, p)| p).collect();
        assert_eq!(order, vec!["earliest", "first", "second"]);
    }

    #[test]
    fn pop_due_moves_clock_to_due_time() {
        let mut timers = TimerRegistry::new();
        timers.schedule(30, ());
        let (_, ()) = timers.pop_due(100).unwrap();
        assert_eq!(timers.now_ms(), 30);
        timers.settle(100);
        assert_eq!(timers.now_ms(), 100);
    }

    #[test]
    fn scheduling_from_a_firing_uses_firing_time() {
        let mut timers = TimerRegistry::new();
        timers.schedule(30, 1);
        let (_, _) = timers.pop_due(100).unwrap();
        timers.schedule(30, 2);
        let (_, p) = timers.pop_due(100).unwrap();
        assert_eq!(p, 2);
        assert_eq!(timers.now_ms(), 60);
    }

    #[test]
    fn repeating_timer_retires_at_end_of_clock() {
        let mut timers = TimerRegistry::new();
        timers.settle(u64::MAX - 5);
        let h = timers.schedule_repeating(4, "tick");
        assert_eq!(timers.pop_due(u64::MAX).map(|(_, p)| p), Some("tick"));
        assert!(timers.pop_due(u64::MAX).is_none());
        assert!(!timers.is_pending(h));
        assert_eq!(timers.pending_count(), 0);
        assert!(timers.advance(u64::MAX).is_empty());
    }

    #[test]
    fn zero_interval_is_raised() {
        let mut timers = TimerRegistry::new();
        timers.schedule_repeating(0, ());
        assert_eq!(timers.advance(3).len(), 3);
    }
}
