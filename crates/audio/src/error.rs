use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("sample buffer is empty")]
    EmptyBuffer,
    #[error("pop index {index} is outside a clip of {len} samples")]
    PopOutOfRange { index: usize, len: usize },
    #[error("raw PCM data has an odd byte count ({0})")]
    TruncatedPcm(usize),
}
