use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fable_playback::{Channel, PlaybackEnd, PlaybackEngine, WordSync};
use fable_story::{ImageHotspot, PageData, StoryData};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::events::*;
use crate::pronounce::Pronouncer;
use crate::runtime::ViewerRuntime;

/// How long a tapped hotspot's word label stays on screen.
pub const HOTSPOT_HIDE_DELAY: Duration = Duration::from_millis(2500);

/// Narration timbre used when the story doesn't carry one.
const DEFAULT_VOICE: &str = "Leo (Warm & Friendly)";

/// Drag-release point, in viewport pixels.
#[derive(Debug, Clone, Copy)]
pub struct DropPoint {
    pub x: f64,
    pub y: f64,
}

/// Bounding box of the illustration container, in viewport pixels.
#[derive(Debug, Clone, Copy)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Orchestrates one story viewing session against the playback engine.
///
/// Owned by the single control task; per-page UI state (edit mode, quiz
/// gate, highlight cursor) lives here and is reset wholesale on every page
/// transition.
pub struct ViewerController {
    engine: PlaybackEngine,
    runtime: Arc<dyn ViewerRuntime>,
    pronouncer: Arc<dyn Pronouncer>,
    edit_mode: bool,
    quiz_answered: bool,
    word_inflight: Arc<AtomicBool>,
    cursor: Option<WordSync>,
    hide_timer: Option<JoinHandle<()>>,
    word_task: Option<JoinHandle<()>>,
    narration_watch: Option<JoinHandle<()>>,
}

impl ViewerController {
    pub fn new(
        engine: PlaybackEngine,
        runtime: Arc<dyn ViewerRuntime>,
        pronouncer: Arc<dyn Pronouncer>,
    ) -> Self {
        Self {
            engine,
            runtime,
            pronouncer,
            edit_mode: false,
            quiz_answered: true,
            word_inflight: Arc::new(AtomicBool::new(false)),
            cursor: None,
            hide_timer: None,
            word_task: None,
            narration_watch: None,
        }
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    /// Reset everything before rendering a new page: silence all channels,
    /// stop the cursor, drop any pending hotspot label and in-flight word
    /// request, leave edit mode, and re-arm the page quiz gate.
    pub fn change_page(&mut self, page: &PageData) {
        tracing::info!("page_changed");

        self.engine.stop_all();
        self.cursor = None;
        if let Some(timer) = self.hide_timer.take() {
            timer.abort();
        }
        if let Some(task) = self.word_task.take() {
            task.abort();
        }
        self.word_inflight.store(false, Ordering::SeqCst);

        self.edit_mode = false;
        self.quiz_answered = page.page_quiz.is_none();

        self.runtime.emit_hotspot(HotspotEvent::Hidden);
        self.runtime
            .emit_highlight(HighlightEvent::Word { index: None });
    }

    /// Start page narration, or stop it if it is already playing.
    ///
    /// Starting preempts every other channel first. Pages with timed text
    /// also get a word-highlight cursor; pages without play plain audio.
    /// Failures surface as a `narrationError` event and leave the controls
    /// in the not-playing state, ready for a retry.
    pub async fn toggle_narration(&mut self, page: &PageData) {
        if self.engine.is_active(Channel::Narration) {
            tracing::info!("narration_stopped_by_user");
            self.engine.stop_all();
            self.cursor = None;
            return;
        }

        self.engine.stop_all();
        self.cursor = None;

        let playing = match self.engine.play(Channel::Narration, &page.audio).await {
            Ok(playing) => playing,
            Err(err) => {
                tracing::warn!(error = %err, "narration_start_failed");
                self.runtime.emit_error(ViewerErrorEvent::Narration {
                    error: err.to_string(),
                });
                return;
            }
        };

        tracing::info!(duration = ?playing.duration, "narration_started");
        self.runtime.emit_narration(NarrationEvent::Started {
            duration_secs: playing.duration.as_secs_f64(),
        });

        if let Some(table) = page.timed_text.as_ref().filter(|table| !table.is_empty()) {
            let runtime = self.runtime.clone();
            self.cursor = Some(WordSync::spawn(
                self.engine.registry(),
                Channel::Narration,
                playing.clock,
                playing.started_at,
                table.clone(),
                move |index| runtime.emit_highlight(HighlightEvent::Word { index }),
            ));
        }

        let runtime = self.runtime.clone();
        let done = playing.done;
        self.narration_watch = Some(tokio::spawn(async move {
            if let Ok(end) = done.await {
                runtime.emit_narration(NarrationEvent::Stopped {
                    completed: end == PlaybackEnd::Completed,
                });
            }
        }));
    }

    /// Pronounce a tapped story word.
    ///
    /// Always preempts narration (and everything else) before fetching the
    /// clip. One word lookup may be in flight at a time; taps while one is
    /// pending are ignored until it settles. Failures are silent apart from
    /// a `pronunciationError` event.
    pub fn tap_word(&mut self, word: &str, voice: Option<&str>) {
        if self.word_inflight.load(Ordering::SeqCst) {
            tracing::debug!(word, "word_tap_ignored_while_inflight");
            return;
        }

        let cleaned: String = word.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        if cleaned.is_empty() {
            return;
        }

        self.engine.stop_all();
        self.cursor = None;
        self.word_inflight.store(true, Ordering::SeqCst);

        let engine = self.engine.clone();
        let runtime = self.runtime.clone();
        let pronouncer = self.pronouncer.clone();
        let inflight = self.word_inflight.clone();
        let voice = voice.unwrap_or(DEFAULT_VOICE).to_string();

        self.word_task = Some(tokio::spawn(async move {
            let outcome = async {
                let payload = pronouncer
                    .pronounce(&cleaned, &voice)
                    .await
                    .map_err(Error::Pronounce)?;
                engine.play(Channel::Word, &payload).await?;
                Ok::<_, Error>(())
            }
            .await;

            inflight.store(false, Ordering::SeqCst);

            if let Err(err) = outcome {
                tracing::warn!(word = %cleaned, error = %err, "word_pronunciation_failed");
                runtime.emit_error(ViewerErrorEvent::Pronunciation {
                    word: cleaned,
                    error: err.to_string(),
                });
            }
        }));
    }

    /// Reveal a hotspot's word label and pronounce it.
    ///
    /// Suppressed entirely in edit mode. Unlike a word tap this does not
    /// preempt narration — hotspot clips and narration may overlap; only a
    /// previous hotspot clip is replaced. The label auto-hides after
    /// [`HOTSPOT_HIDE_DELAY`]; a new tap cancels the previous hide timer.
    pub async fn tap_hotspot(&mut self, hotspot: &ImageHotspot, voice: Option<&str>) {
        if self.edit_mode {
            return;
        }

        if let Some(timer) = self.hide_timer.take() {
            timer.abort();
        }
        self.engine.stop(Channel::Hotspot);

        self.runtime.emit_hotspot(HotspotEvent::Revealed {
            word: hotspot.word.clone(),
            x: hotspot.x,
            y: hotspot.y,
        });

        let voice = voice.unwrap_or(DEFAULT_VOICE);
        let outcome = async {
            let payload = self
                .pronouncer
                .pronounce(&hotspot.word, voice)
                .await
                .map_err(Error::Pronounce)?;
            self.engine.play(Channel::Hotspot, &payload).await?;
            Ok::<_, Error>(())
        }
        .await;

        if let Err(err) = outcome {
            tracing::warn!(word = %hotspot.word, error = %err, "hotspot_pronunciation_failed");
            self.runtime.emit_error(ViewerErrorEvent::Pronunciation {
                word: hotspot.word.clone(),
                error: err.to_string(),
            });
        }

        let runtime = self.runtime.clone();
        self.hide_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(HOTSPOT_HIDE_DELAY).await;
            runtime.emit_hotspot(HotspotEvent::Hidden);
        }));
    }

    /// Re-place a hotspot after an edit-mode drag.
    ///
    /// Converts the drop point to percent coordinates of the container and
    /// clamps both axes to `0..=100`. Returns the replacement story value
    /// (the caller's story stays untouched — the external contract is an
    /// immutable update), or `None` outside edit mode, for a degenerate
    /// container, or for out-of-range indices.
    pub fn drop_hotspot(
        &self,
        story: &StoryData,
        page: usize,
        hotspot: usize,
        drop: DropPoint,
        container: ContainerRect,
    ) -> Option<StoryData> {
        if !self.edit_mode {
            return None;
        }
        if container.width <= 0.0 || container.height <= 0.0 {
            return None;
        }

        let x = (drop.x - container.left) / container.width * 100.0;
        let y = (drop.y - container.top) / container.height * 100.0;

        let mut updated = story.clone();
        let moved = updated.move_hotspot(page, hotspot, x, y);
        moved.then_some(updated)
    }

    /// Play a vocabulary clip (definition or fun-fact audio) on the vocab
    /// channel, replacing any vocab clip already playing.
    pub async fn play_vocab_clip(&self, payload: &str) -> Result<()> {
        self.engine.play(Channel::Vocab, payload).await?;
        Ok(())
    }

    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        self.edit_mode = edit_mode;
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// The "next page" gate: false until the page quiz (if any) is answered.
    pub fn can_advance(&self) -> bool {
        self.quiz_answered
    }

    pub fn mark_quiz_answered(&mut self) {
        self.quiz_answered = true;
    }

    pub fn is_narration_playing(&self) -> bool {
        self.engine.is_active(Channel::Narration)
    }

    pub fn is_word_request_inflight(&self) -> bool {
        self.word_inflight.load(Ordering::SeqCst)
    }

    /// Component exit: silence everything and drop scheduled work.
    pub fn exit(&mut self) {
        tracing::info!("viewer_exited");
        self.engine.stop_all();
        self.cursor = None;
        if let Some(timer) = self.hide_timer.take() {
            timer.abort();
        }
        if let Some(task) = self.word_task.take() {
            task.abort();
        }
        self.word_inflight.store(false, Ordering::SeqCst);
    }
}
