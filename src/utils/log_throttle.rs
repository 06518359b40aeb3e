use std::sync::Mutex;
use std::time::{Duration, Instant};

struct WindowState {
    window_started_at: Instant,
    suppressed: u64,
}

/// Rate-limits one repetitive log statement to a single emission per window,
/// counting how many events were swallowed in between.
pub struct LogThrottle {
    window: Duration,
    state: Mutex<Option<WindowState>>,
}

impl LogThrottle {
    pub fn new(window: Duration) -> Self {
        LogThrottle {
            window,
            state: Mutex::new(None),
        }
    }

    /// Returns `Some(suppressed_count)` when the caller should emit its log
    /// line, otherwise `None` and the event is counted as suppressed for the
    /// active window.
    pub fn should_emit(&self) -> Option<u64> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Instant::now();

        match state.as_mut() {
            Some(active) => {
                if now.duration_since(active.window_started_at) >= self.window {
                    let suppressed = active.suppressed;
                    active.window_started_at = now;
                    active.suppressed = 0;
                    Some(suppressed)
                } else {
                    active.suppressed += 1;
                    None
                }
            }
            None => {
                *state = Some(WindowState {
                    window_started_at: now,
                    suppressed: 0,
                });
                Some(0)
            }
        }
    }
}
