//! Cancellable one-shot and repeating timers driven by the frame tick.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    handle: TimerHandle,
    due: f32,
    /// Set for repeating timers
    period: Option<f32>,
    event: E,
}

/// Timer queue with its own clock. The clock only moves when the owner
/// advances it, so everything scheduled here runs on game time.
#[derive(Debug, Clone)]
pub struct Timers<E> {
    now: f32,
    next_handle: u64,
    entries: Vec<Entry<E>>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_handle: 0,
            entries: Vec::new(),
        }
    }

    /// Seconds of game time elapsed
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    fn push(&mut self, delay: f32, period: Option<f32>, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            due: self.now + delay.max(0.0),
            period,
            event,
        });
        handle
    }

    pub fn schedule_once(&mut self, delay: f32, event: E) -> TimerHandle {
        self.push(delay, None, event)
    }

    /// Fires `event` every `interval` seconds, first one `interval` from now
    pub fn schedule_every(&mut self, interval: f32, event: E) -> TimerHandle {
        debug_assert!(interval > 0.0, "repeating timer needs a positive interval");
        self.push(interval, Some(interval), event)
    }

    /// Returns false if the timer already fired (one-shot) or was never scheduled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Moves the clock forward without firing anything
    pub fn advance_to(&mut self, until: f32) {
        self.now = self.now.max(until);
    }
}

/// `due + period`, but always strictly later than `due` even once the clock
/// is large enough for `period` to round away
fn next_due(due: f32, period: f32) -> f32 {
    let next = due + period;
    if next > due {
        next
    } else {
        f32::from_bits(due.to_bits() + 1)
    }
}

impl<E: Clone> Timers<E> {
    /// Pops the earliest timer due at or before `until` and moves the clock to
    /// its due time. Calling this in a loop lets the caller react to each event
    /// (and schedule or cancel timers) before the next one is looked at.
    pub fn poll(&mut self, until: f32) -> Option<E> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.handle.cmp(&b.handle)))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[index];
        self.now = self.now.max(entry.due);
        let period = entry.period;
        match period {
            Some(period) => {
                entry.due = next_due(entry.due.max(self.now), period);
                Some(entry.event.clone())
            }
            None => Some(self.entries.swap_remove(index).event),
        }
    }

    /// Advances the clock by `dt`, returning every event that fired in order
    pub fn advance(&mut self, dt: f32) -> Vec<E> {
        let until = self.now + dt;
        let mut fired = Vec::new();
        while let Some(event) = self.poll(until) {
            fired.push(event);
        }
        self.advance_to(until);
        fired
    }
}
