use crate::events::*;

/// Host surface the controller emits into: a Tauri shell, a terminal demo,
/// or a test recorder.
pub trait ViewerRuntime: Send + Sync {
    fn emit_highlight(&self, event: HighlightEvent);
    fn emit_narration(&self, event: NarrationEvent);
    fn emit_hotspot(&self, event: HotspotEvent);
    fn emit_error(&self, event: ViewerErrorEvent);
}
