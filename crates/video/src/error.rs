use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height} RGB24")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame {index} is {width}x{height}, sequence is {expected_width}x{expected_height}")]
    MixedDimensions {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
}
