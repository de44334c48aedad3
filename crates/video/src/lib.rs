//! Motion descriptors from the low-resolution frames around a glove pop.

pub mod edge;
pub mod error;
pub mod extractor;
pub mod frame;
pub mod motion;
pub mod zones;

pub use error::VideoError;
pub use extractor::{VideoConfig, VideoMotionExtractor};
pub use frame::{GrayFrame, RgbFrame};
pub use zones::{default_zones, Zone};
