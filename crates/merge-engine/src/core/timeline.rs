// core/timeline.rs
//
// Deferred actions on the single simulation timeline.
//
// Each entry carries the epoch it was scheduled in. `cancel_all` bumps the
// epoch, so anything scheduled before a reset is dropped instead of firing
// into the fresh session.

/// Tolerance for float drift when summing fixed ticks.
const DUE_EPSILON: f64 = 1e-4;

/// Something the game asked to happen later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineAction {
    /// Spawn the next aimed piece (end of the post-release cooldown).
    SpawnNext,
    /// Allow releasing the aimed piece (end of the spawn debounce).
    EnableDrop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAction {
    /// Timeline time (seconds) at which the action fires.
    pub due: f64,
    /// Epoch the action belongs to.
    pub epoch: u32,
    pub action: TimelineAction,
}

#[derive(Debug, Default)]
pub struct Timeline {
    /// Kept in f64 so long sessions don't stall the clock.
    now: f64,
    epoch: u32,
    pending: Vec<ScheduledAction>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current timeline time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Schedule `action` to fire `delay` seconds from now in the current epoch.
    pub fn schedule(&mut self, delay: f32, action: TimelineAction) -> ScheduledAction {
        let entry = ScheduledAction {
            due: self.now + f64::from(delay.max(0.0)),
            epoch: self.epoch,
            action,
        };
        self.pending.push(entry);
        entry
    }

    /// Advance time by `dt` and return the actions that came due, earliest
    /// first (ties keep scheduling order). Entries from older epochs are
    /// discarded without firing.
    pub fn advance(&mut self, dt: f32) -> Vec<TimelineAction> {
        self.now += f64::from(dt);
        let epoch = self.epoch;
        let before = self.pending.len();
        self.pending.retain(|entry| entry.epoch == epoch);
        let stale = before - self.pending.len();
        if stale > 0 {
            log::debug!("timeline: dropped {} stale action(s)", stale);
        }

        let now = self.now + DUE_EPSILON;
        let mut due: Vec<ScheduledAction> = Vec::new();
        self.pending.retain(|entry| {
            if entry.due <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due.into_iter().map(|entry| entry.action).collect()
    }

    /// Invalidate every scheduled action.
    pub fn cancel_all(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Number of live (current-epoch) entries still waiting.
    pub fn pending_count(&self) -> usize {
        self.pending.iter().filter(|e| e.epoch == self.epoch).count()
    }
}
