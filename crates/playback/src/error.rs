#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] fable_pcm::Error),
    #[error("audio output unavailable: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, Error>;
