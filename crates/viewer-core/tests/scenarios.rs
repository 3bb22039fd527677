//! End-to-end viewer scenarios on a paused clock: a headless output, a
//! recording runtime, and a stub pronunciation source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine as _;
use bytes::BufMut;
use fable_playback::{Channel, NullOutput, PlaybackEngine};
use fable_story::{ImageHotspot, PageData};
use fable_timed_text::{TimedWord, WordTable};
use viewer_core::{
    BoxFuture, HighlightEvent, HotspotEvent, NarrationEvent, PronounceError, Pronouncer,
    ViewerController, ViewerErrorEvent, ViewerRuntime,
};

#[derive(Default)]
struct RecordingRuntime {
    highlights: Mutex<Vec<Option<usize>>>,
    narration: Mutex<Vec<NarrationEvent>>,
    hotspots: Mutex<Vec<HotspotEvent>>,
    errors: Mutex<Vec<ViewerErrorEvent>>,
}

impl RecordingRuntime {
    fn last_highlight(&self) -> Option<Option<usize>> {
        self.highlights.lock().unwrap().last().copied()
    }

    fn hidden_count(&self) -> usize {
        self.hotspots
            .lock()
            .unwrap()
            .iter()
            .filter(|event| matches!(event, HotspotEvent::Hidden))
            .count()
    }
}

impl ViewerRuntime for RecordingRuntime {
    fn emit_highlight(&self, event: HighlightEvent) {
        let HighlightEvent::Word { index } = event;
        self.highlights.lock().unwrap().push(index);
    }

    fn emit_narration(&self, event: NarrationEvent) {
        self.narration.lock().unwrap().push(event);
    }

    fn emit_hotspot(&self, event: HotspotEvent) {
        self.hotspots.lock().unwrap().push(event);
    }

    fn emit_error(&self, event: ViewerErrorEvent) {
        self.errors.lock().unwrap().push(event);
    }
}

struct StubPronouncer {
    payload: String,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubPronouncer {
    fn new(payload: String) -> Self {
        Self {
            payload,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_delay(payload: String, delay: Duration) -> Self {
        Self {
            payload,
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Pronouncer for StubPronouncer {
    fn pronounce<'a>(
        &'a self,
        _word: &'a str,
        _voice: &'a str,
    ) -> BoxFuture<'a, Result<String, PronounceError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.payload.clone())
        })
    }
}

struct FailingPronouncer {
    calls: AtomicUsize,
}

impl Pronouncer for FailingPronouncer {
    fn pronounce<'a>(
        &'a self,
        _word: &'a str,
        _voice: &'a str,
    ) -> BoxFuture<'a, Result<String, PronounceError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err("voice service unavailable".into()) })
    }
}

/// Base64 PCM payload of `secs` seconds of silence at the fixed rate.
fn payload_secs(secs: f64) -> String {
    let frames = (secs * 24_000.0) as usize;
    let mut bytes = bytes::BytesMut::with_capacity(frames * 2);
    for _ in 0..frames {
        bytes.put_i16_le(0);
    }
    base64::engine::general_purpose::STANDARD.encode(&bytes)
}

fn narrated_page() -> PageData {
    PageData {
        text: "Once upon".into(),
        audio: payload_secs(1.0),
        timed_text: Some(WordTable::new(vec![
            TimedWord {
                word: "Once".into(),
                start: 0.0,
                end: 0.5,
            },
            TimedWord {
                word: "upon".into(),
                start: 0.5,
                end: 0.9,
            },
        ])),
        ..Default::default()
    }
}

fn setup(
    pronouncer: Arc<dyn Pronouncer>,
) -> (ViewerController, Arc<RecordingRuntime>, NullOutput) {
    let output = NullOutput::new();
    let runtime = Arc::new(RecordingRuntime::default());
    let controller = ViewerController::new(
        PlaybackEngine::new(Arc::new(output.clone())),
        runtime.clone(),
        pronouncer,
    );
    (controller, runtime, output)
}

async fn advance(duration: Duration) {
    tokio::time::advance(duration).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn narration_highlight_follows_the_clock() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.2)));
    let (mut controller, runtime, _) = setup(pronouncer);

    controller.toggle_narration(&narrated_page()).await;
    assert!(controller.is_narration_playing());

    advance(Duration::from_millis(300)).await;
    assert_eq!(runtime.last_highlight(), Some(Some(0)));

    advance(Duration::from_millis(400)).await;
    assert_eq!(runtime.last_highlight(), Some(Some(1)));

    advance(Duration::from_millis(400)).await;
    assert_eq!(runtime.last_highlight(), Some(None));
    assert!(!controller.is_narration_playing());
    assert_eq!(
        runtime.narration.lock().unwrap().last(),
        Some(&NarrationEvent::Stopped { completed: true })
    );
}

#[tokio::test(start_paused = true)]
async fn toggling_twice_stops_narration() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.2)));
    let (mut controller, runtime, output) = setup(pronouncer);
    let page = narrated_page();

    controller.toggle_narration(&page).await;
    advance(Duration::from_millis(100)).await;

    controller.toggle_narration(&page).await;
    advance(Duration::from_millis(50)).await;

    assert!(!controller.is_narration_playing());
    assert_eq!(output.stop_count(0), 1);
    assert_eq!(runtime.last_highlight(), Some(None));
    assert_eq!(
        runtime.narration.lock().unwrap().last(),
        Some(&NarrationEvent::Stopped { completed: false })
    );
}

#[tokio::test(start_paused = true)]
async fn word_tap_preempts_narration_and_clears_highlight() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.2)));
    let (mut controller, runtime, output) = setup(pronouncer.clone());

    controller.toggle_narration(&narrated_page()).await;
    advance(Duration::from_millis(100)).await;
    assert_eq!(runtime.last_highlight(), Some(Some(0)));

    controller.tap_word("Once,", None);
    advance(Duration::from_millis(50)).await;

    assert!(!controller.is_narration_playing());
    assert!(controller.engine().is_active(Channel::Word));
    assert_eq!(runtime.last_highlight(), Some(None));
    assert_eq!(output.stop_count(0), 1);
    assert_eq!(pronouncer.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn second_word_tap_is_ignored_while_one_is_inflight() {
    let pronouncer = Arc::new(StubPronouncer::with_delay(
        payload_secs(0.2),
        Duration::from_millis(500),
    ));
    let (mut controller, _, _) = setup(pronouncer.clone());

    controller.tap_word("cat", None);
    assert!(controller.is_word_request_inflight());

    controller.tap_word("dog", None);
    assert_eq!(pronouncer.calls(), 1);

    advance(Duration::from_millis(600)).await;
    assert!(!controller.is_word_request_inflight());
    assert!(controller.engine().is_active(Channel::Word));

    controller.tap_word("dog", None);
    assert_eq!(pronouncer.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn pronunciation_failure_clears_the_guard_and_stays_silent() {
    let pronouncer = Arc::new(FailingPronouncer {
        calls: AtomicUsize::new(0),
    });
    let (mut controller, runtime, _) = setup(pronouncer.clone());

    controller.tap_word("cat", None);
    advance(Duration::from_millis(10)).await;

    assert!(!controller.is_word_request_inflight());
    assert!(!controller.engine().is_active(Channel::Word));
    assert!(matches!(
        runtime.errors.lock().unwrap().last(),
        Some(ViewerErrorEvent::Pronunciation { .. })
    ));

    controller.tap_word("dog", None);
    assert_eq!(pronouncer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn hotspot_tap_does_not_preempt_narration() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.2)));
    let (mut controller, _, _) = setup(pronouncer);

    let mut page = narrated_page();
    page.audio = payload_secs(3.0);
    controller.toggle_narration(&page).await;

    let hotspot = ImageHotspot {
        word: "fox".into(),
        x: 30.0,
        y: 40.0,
    };
    controller.tap_hotspot(&hotspot, None).await;
    advance(Duration::from_millis(50)).await;

    assert!(controller.is_narration_playing());
    assert!(controller.engine().is_active(Channel::Hotspot));
}

#[tokio::test(start_paused = true)]
async fn rapid_hotspot_taps_keep_only_the_second_label() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.5)));
    let (mut controller, runtime, output) = setup(pronouncer);

    let fox = ImageHotspot {
        word: "fox".into(),
        x: 30.0,
        y: 40.0,
    };
    let bear = ImageHotspot {
        word: "bear".into(),
        x: 60.0,
        y: 20.0,
    };

    controller.tap_hotspot(&fox, None).await;
    advance(Duration::from_millis(100)).await;
    controller.tap_hotspot(&bear, None).await;

    // First clip was replaced on the hotspot channel.
    assert_eq!(output.stop_count(0), 1);
    assert!(controller.engine().is_active(Channel::Hotspot));

    let revealed: Vec<_> = runtime
        .hotspots
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            HotspotEvent::Revealed { word, .. } => Some(word.clone()),
            HotspotEvent::Hidden => None,
        })
        .collect();
    assert_eq!(revealed, vec!["fox".to_string(), "bear".to_string()]);

    // Only the second hide timer survives.
    advance(Duration::from_millis(2600)).await;
    assert_eq!(runtime.hidden_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn edit_mode_suppresses_hotspot_reveal() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.2)));
    let (mut controller, runtime, _) = setup(pronouncer.clone());

    controller.set_edit_mode(true);
    let hotspot = ImageHotspot {
        word: "fox".into(),
        x: 30.0,
        y: 40.0,
    };
    controller.tap_hotspot(&hotspot, None).await;

    assert!(runtime.hotspots.lock().unwrap().is_empty());
    assert_eq!(pronouncer.calls(), 0);
    assert!(!controller.engine().is_active(Channel::Hotspot));
}

#[tokio::test(start_paused = true)]
async fn page_change_resets_all_state() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.2)));
    let (mut controller, runtime, _) = setup(pronouncer);

    let page = narrated_page();
    controller.toggle_narration(&page).await;
    controller.set_edit_mode(true);
    advance(Duration::from_millis(100)).await;
    assert!(controller.is_narration_playing());

    controller.change_page(&PageData::default());
    advance(Duration::from_millis(50)).await;

    for channel in Channel::ALL {
        assert!(!controller.engine().is_active(channel));
    }
    assert!(!controller.is_edit_mode());
    assert!(controller.can_advance());
    assert_eq!(runtime.last_highlight(), Some(None));
    assert_eq!(
        runtime.narration.lock().unwrap().last(),
        Some(&NarrationEvent::Stopped { completed: false })
    );
}

#[tokio::test(start_paused = true)]
async fn narration_decode_failure_is_retriggerable() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.2)));
    let (mut controller, runtime, _) = setup(pronouncer);

    let mut bad_page = narrated_page();
    bad_page.audio = "definitely not audio".into();

    controller.toggle_narration(&bad_page).await;
    assert!(!controller.is_narration_playing());
    assert!(matches!(
        runtime.errors.lock().unwrap().last(),
        Some(ViewerErrorEvent::Narration { .. })
    ));
    assert!(runtime.narration.lock().unwrap().is_empty());

    // Same control retried with a good payload works.
    controller.toggle_narration(&narrated_page()).await;
    assert!(controller.is_narration_playing());
    assert_eq!(
        runtime.narration.lock().unwrap().first(),
        Some(&NarrationEvent::Started { duration_secs: 1.0 })
    );
}

#[tokio::test(start_paused = true)]
async fn vocab_clips_replace_each_other() {
    let pronouncer = Arc::new(StubPronouncer::new(payload_secs(0.2)));
    let (controller, _, output) = setup(pronouncer);

    controller.play_vocab_clip(&payload_secs(1.0)).await.unwrap();
    controller.play_vocab_clip(&payload_secs(1.0)).await.unwrap();

    assert!(controller.engine().is_active(Channel::Vocab));
    assert_eq!(output.started(), 2);
    assert_eq!(output.stop_count(0), 1);
    assert_eq!(output.stop_count(1), 0);
}
