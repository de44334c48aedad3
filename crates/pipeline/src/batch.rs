//! Many clips at once, plus the pitch typing stage that needs the whole
//! batch.

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use pitchcall_classifier::{
    classify_unsupervised, select_model, ClassifierConfig, ClassifierError, ModelSelection,
};
use pitchcall_domain::{PitchReport, TrainingExample};

use crate::pipeline::{PitchAnalysis, PitchAnalyzer, PitchClip};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipFailure {
    pub id: String,
    pub error: String,
}

/// Successful analyses and failed clips, each in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub analyses: Vec<PitchAnalysis>,
    pub failures: Vec<ClipFailure>,
}

/// Analyzes clips in parallel. A failing clip is recorded and does not stop
/// the others.
#[instrument(skip_all, fields(clips = clips.len()))]
pub fn analyze_batch(analyzer: &PitchAnalyzer, clips: &[PitchClip]) -> BatchOutcome {
    let results: Vec<Result<PitchAnalysis>> =
        clips.par_iter().map(|clip| analyzer.analyze(clip)).collect();

    let mut outcome = BatchOutcome::default();
    for (clip, result) in clips.iter().zip(results) {
        match result {
            Ok(analysis) => outcome.analyses.push(analysis),
            Err(err) => {
                warn!(id = %clip.id, error = %format!("{err:#}"), "clip failed");
                outcome.failures.push(ClipFailure {
                    id: clip.id.clone(),
                    error: format!("{err:#}"),
                });
            }
        }
    }
    info!(
        analyzed = outcome.analyses.len(),
        failed = outcome.failures.len(),
        "batch finished"
    );
    outcome
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchTyping {
    /// One entry per analysis; `None` where no label could be given.
    pub labels: Vec<Option<String>>,
    /// The winning combination when a training set was used.
    pub selection: Option<ModelSelection>,
}

/// Labels every pitch of a batch. Without a training set the batch is
/// clustered by fastball score; with one, the best feature set and k are
/// chosen by leave-one-out and every pitch is classified with them.
#[instrument(skip_all, fields(pitches = analyses.len(), supervised = training.is_some()))]
pub fn assign_pitch_types(
    analyses: &[PitchAnalysis],
    training: Option<&[TrainingExample]>,
    config: &ClassifierConfig,
) -> Result<PitchTyping> {
    match training {
        Some(examples) => supervised(analyses, examples, config),
        None => unsupervised(analyses, config),
    }
}

fn unsupervised(analyses: &[PitchAnalysis], config: &ClassifierConfig) -> Result<PitchTyping> {
    let mut labels = vec![None; analyses.len()];
    let (indices, signatures): (Vec<usize>, Vec<_>) = analyses
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.signature.map(|s| (i, s)))
        .unzip();
    if signatures.is_empty() {
        info!("no pops to type");
        return Ok(PitchTyping {
            labels,
            selection: None,
        });
    }

    let typing = classify_unsupervised(&signatures, &config.weights, &config.kmeans())?;
    for (index, label) in indices.into_iter().zip(typing.labels) {
        labels[index] = Some(label.to_string());
    }
    Ok(PitchTyping {
        labels,
        selection: None,
    })
}

fn supervised(
    analyses: &[PitchAnalysis],
    examples: &[TrainingExample],
    config: &ClassifierConfig,
) -> Result<PitchTyping> {
    let selection = select_model(examples, &config.feature_sets, &config.k_grid)?;
    let knn = selection.build(examples)?;

    let mut labels = Vec::with_capacity(analyses.len());
    for analysis in analyses {
        if analysis.pop.is_none() {
            labels.push(None);
            continue;
        }
        match knn.predict(&analysis.features(), selection.k) {
            Ok(result) => labels.push(Some(result.predicted)),
            Err(ClassifierError::MissingFeatures(set)) => {
                warn!(id = %analysis.id, feature_set = %set, "pitch lacks the selected features");
                labels.push(None);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(PitchTyping {
        labels,
        selection: Some(selection),
    })
}

/// Report rows for a batch, with labels from [`assign_pitch_types`] when
/// available.
pub fn build_reports(analyses: &[PitchAnalysis], typing: Option<&PitchTyping>) -> Vec<PitchReport> {
    analyses
        .iter()
        .enumerate()
        .map(|(i, analysis)| {
            let label = typing.and_then(|t| t.labels.get(i)).and_then(|l| l.as_deref());
            analysis.report(label)
        })
        .collect()
}
