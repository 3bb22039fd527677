use std::sync::Arc;
use std::time::Duration;

use fable_timed_text::WordTable;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::AudioClock;
use crate::registry::{Channel, ChannelRegistry};

const TICK: Duration = Duration::from_millis(16);

/// Cooperative word-highlight cursor for one narration clip.
///
/// Ticks roughly once per display frame; each tick derives liveness from
/// the registry (natural completion, explicit stop, and preemption all look
/// the same from here) and maps elapsed clock time to a word index.
/// `on_change` fires only when the index changes, and fires a final `None`
/// when the cursor stops while a word is highlighted.
///
/// [`Self::cancel`] exists for hosts that tear the cursor down ahead of the
/// registry (page transitions); dropping the cursor cancels it too.
pub struct WordSync {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl WordSync {
    pub fn spawn(
        registry: Arc<ChannelRegistry>,
        channel: Channel,
        clock: AudioClock,
        started_at: Duration,
        table: WordTable,
        on_change: impl Fn(Option<usize>) + Send + 'static,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last: Option<usize> = None;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if !registry.is_active(channel) {
                            break;
                        }
                        let elapsed = clock.now().saturating_sub(started_at).as_secs_f64();
                        let index = table.active_index(elapsed);
                        if index != last {
                            last = index;
                            on_change(index);
                        }
                    }
                }
            }

            if last.is_some() {
                on_change(None);
            }
            tracing::debug!(%channel, "word_sync_stopped");
        });

        Self { cancel, handle }
    }

    /// Explicit cancellation; the derived registry check covers the usual
    /// end-of-narration paths without it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for WordSync {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
