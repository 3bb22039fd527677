#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("payload is {len} bytes, not a whole number of 16-bit samples")]
    TruncatedPayload { len: usize },
    #[error("payload decodes to zero samples")]
    EmptyPayload,
}
