use std::future::Future;
use std::pin::Pin;

pub type PronounceError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async source of single-word pronunciation clips — the seam to the
/// generation collaborator.
///
/// Returns the clip as a base64 PCM payload (the same shape page narration
/// arrives in). Implementations own transport, retries, and any caching;
/// the controller treats every call as best-effort and never retries.
///
/// Object-safe via the explicit `BoxFuture` return type, so the controller
/// can hold a `dyn Pronouncer`.
pub trait Pronouncer: Send + Sync {
    fn pronounce<'a>(
        &'a self,
        word: &'a str,
        voice: &'a str,
    ) -> BoxFuture<'a, Result<String, PronounceError>>;
}
