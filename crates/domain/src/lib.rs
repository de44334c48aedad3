pub mod error;
pub mod events;
pub mod features;
pub mod io;
pub mod pitch;
pub mod report;
pub mod samples;

pub use crate::error::DomainError;
pub use crate::events::{CallConfidence, GlovePopEvent, UmpireCall, UmpireCallResult};
pub use crate::features::{
    fuse_features, AcousticFeatures, FeatureVector, PopSignature, VideoFeatureMap,
};
pub use crate::io::{export_reports, ExportFormat, ReportExporter};
pub use crate::pitch::{ClassificationResult, LabelVotes, PitchType, TrainingExample};
pub use crate::report::{round_to, PitchReport};
pub use crate::samples::{SampleBuffer, DEFAULT_SAMPLE_RATE};
