use std::time::Duration;

/// Shared playback clock, one per engine.
///
/// Reads as elapsed time since the engine was created. Built on
/// `tokio::time::Instant` so tests under `start_paused` runtimes drive the
/// clock, the word-sync ticks, and natural-completion timers together with
/// `tokio::time::advance`.
#[derive(Debug, Clone, Copy)]
pub struct AudioClock {
    origin: tokio::time::Instant,
}

impl AudioClock {
    pub(crate) fn start() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }

    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
