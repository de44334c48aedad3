pub mod acoustic;
pub mod dsp;
pub mod envelope;
pub mod error;
pub mod io;
pub mod pop;
pub mod umpire;

pub use acoustic::{acoustic_features, analyze_pop_signature};
pub use envelope::Envelope;
pub use error::AudioError;
pub use io::PcmReader;
pub use pop::{GlovePopDetector, PopDetectorConfig};
pub use umpire::{DecisionPolicy, ScoreTier, ScoringTable, UmpireCallScorer, UmpireConfig};
