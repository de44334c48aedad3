use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pitchcall_classifier::{
    select_model, ClassifierError, FeatureSet, KnnClassifier, ModelSelection, DEFAULT_K_GRID,
};
use pitchcall_domain::{FeatureVector, TrainingExample};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Pick the pitch-type k-NN feature set and k by leave-one-out"
)]
struct Args {
    /// JSON array of `{label, features}` records
    training: PathBuf,
    /// JSON array of `{id, features}` records to classify with the winner
    #[arg(short, long)]
    query: Option<PathBuf>,
    /// k values to sweep
    #[arg(short, long, value_delimiter = ',')]
    k: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct QueryRecord {
    id: String,
    features: FeatureVector,
}

#[derive(Debug, Serialize)]
struct QueryPrediction {
    id: String,
    predicted: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    selection: ModelSelection,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    predictions: Vec<QueryPrediction>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Labels each query; a query without any of the selected features stays
/// unlabeled.
fn classify_queries(
    knn: &KnnClassifier,
    k: usize,
    queries: Vec<QueryRecord>,
) -> Result<Vec<QueryPrediction>, ClassifierError> {
    let mut predictions = Vec::with_capacity(queries.len());
    for query in queries {
        let predicted = match knn.predict(&query.features, k) {
            Ok(result) => Some(result.predicted),
            Err(ClassifierError::MissingFeatures(set)) => {
                warn!(id = %query.id, feature_set = %set, "query lacks the selected features");
                None
            }
            Err(err) => return Err(err),
        };
        predictions.push(QueryPrediction {
            id: query.id,
            predicted,
        });
    }
    Ok(predictions)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let examples: Vec<TrainingExample> = read_json(&args.training)?;
    info!(count = examples.len(), "loaded training set");

    let ks = if args.k.is_empty() {
        DEFAULT_K_GRID.to_vec()
    } else {
        args.k.clone()
    };
    let selection = select_model(&examples, &FeatureSet::defaults(), &ks)?;

    let predictions = match &args.query {
        Some(path) => {
            let queries: Vec<QueryRecord> = read_json(path)?;
            let knn = selection.build(&examples)?;
            classify_queries(&knn, selection.k, queries)?
        }
        None => Vec::new(),
    };

    let summary = Summary {
        selection,
        predictions,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
