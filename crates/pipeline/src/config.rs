use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pitchcall_audio::{PopDetectorConfig, UmpireConfig};
use pitchcall_classifier::ClassifierConfig;
use pitchcall_domain::DEFAULT_SAMPLE_RATE;
use pitchcall_video::VideoConfig;

/// Every tunable of the analysis, loadable from YAML. Missing sections and
/// fields fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rate of the raw PCM inputs.
    pub sample_rate: u32,
    pub pop: PopDetectorConfig,
    pub umpire: UmpireConfig,
    pub video: VideoConfig,
    pub classifier: ClassifierConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            pop: PopDetectorConfig::default(),
            umpire: UmpireConfig::default(),
            video: VideoConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AnalysisConfig::from_yaml(
            "sample_rate: 48000\numpire:\n  sustain_factor: 1.5\nclassifier:\n  k_grid: [1, 3]\n",
        )
        .unwrap();
        assert_eq!(config.sample_rate, 48_000);
        assert_abs_diff_eq!(config.umpire.sustain_factor, 1.5);
        assert_abs_diff_eq!(config.umpire.frame_ms, 20.0);
        assert_eq!(config.classifier.k_grid, vec![1, 3]);
        assert_eq!(config.classifier.kmeans_iterations, 50);
        assert_abs_diff_eq!(config.video.fps, 30.0);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pop:\n  threshold_factor: 6.0").unwrap();
        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_abs_diff_eq!(config.pop.threshold_factor, 6.0);
    }

    #[test]
    fn kmeans_needs_exactly_three_seeds() {
        assert!(AnalysisConfig::from_yaml("classifier:\n  kmeans_seed_percentiles: []\n").is_err());
        assert!(AnalysisConfig::from_yaml(
            "classifier:\n  kmeans_seed_percentiles: [0.1, 0.3, 0.5, 0.7, 0.9]\n"
        )
        .is_err());
        let config = AnalysisConfig::from_yaml(
            "classifier:\n  kmeans_seed_percentiles: [0.1, 0.5, 0.9]\n",
        )
        .unwrap();
        assert_eq!(config.classifier.kmeans_seed_percentiles, [0.1, 0.5, 0.9]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(AnalysisConfig::load("does-not-exist.yaml").is_err());
    }
}
