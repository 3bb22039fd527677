use crate::pronounce::PronounceError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Playback(#[from] fable_playback::Error),
    #[error("pronunciation fetch failed: {0}")]
    Pronounce(PronounceError),
}

impl From<PronounceError> for Error {
    fn from(err: PronounceError) -> Self {
        Error::Pronounce(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
