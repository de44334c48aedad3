pub mod batch;
pub mod config;
pub mod frames;
pub mod pipeline;

pub use batch::{analyze_batch, assign_pitch_types, build_reports, BatchOutcome, ClipFailure, PitchTyping};
pub use config::AnalysisConfig;
pub use frames::{FrameProvider, FrameWindow, NoFrames, RawFrameFile};
pub use pipeline::{PitchAnalysis, PitchAnalyzer, PitchClip};
