use std::time::{Duration, Instant};

const PERIOD: Duration = Duration::from_secs(1);

/// Cancellable whole-second schedule for the game clock.
///
/// At most one deadline is outstanding at any time: `arm` is a no-op while
/// armed, `cancel` while cancelled. `poll` reports how many whole seconds
/// came due and moves the deadline forward by exactly that many periods, so
/// late polls don't accumulate drift.
#[derive(Clone, Copy, Debug, Default)]
pub struct Countdown {
    deadline: Option<Instant>,
}

impl Countdown {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn arm(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + PERIOD);
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Number of ticks due at `now`. Returns 0 while cancelled.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut deadline) = self.deadline else {
            return 0;
        };

        let mut due = 0;
        while now >= deadline {
            due += 1;
            deadline += PERIOD;
        }
        self.deadline = Some(deadline);
        due
    }
}
