use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pitchcall_audio::{GlovePopDetector, PcmReader};
use pitchcall_domain::{export_reports, ExportFormat, TrainingExample};
use pitchcall_pipeline::{
    analyze_batch, assign_pitch_types, build_reports, AnalysisConfig, PitchAnalyzer, PitchClip,
    RawFrameFile,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => ExportFormat::Json,
            Format::Yaml => ExportFormat::Yaml,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Call balls and strikes from catcher-mic audio", long_about = None)]
struct Cli {
    /// Raw little-endian s16 mono PCM files, one pitch each
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// YAML file overriding analysis defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Raw RGB24 frame files, one per input in the same order
    #[arg(long)]
    frames: Vec<PathBuf>,
    #[arg(long, default_value_t = 160)]
    width: u32,
    #[arg(long, default_value_t = 120)]
    height: u32,
    /// Frame rate of the frame files; defaults to the configured rate
    #[arg(long)]
    fps: Option<f64>,
    /// Labeled JSON training set; enables supervised pitch typing
    #[arg(short, long)]
    training: Option<PathBuf>,
    /// Skip pitch typing
    #[arg(long)]
    no_typing: bool,
    /// Print ranked pop candidates instead of reports
    #[arg(long)]
    candidates: bool,
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn clip_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_training(path: &Path) -> Result<Vec<TrainingExample>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read training set {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid training set {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    anyhow::ensure!(
        cli.frames.is_empty() || cli.frames.len() == cli.inputs.len(),
        "got {} frame files for {} inputs",
        cli.frames.len(),
        cli.inputs.len()
    );

    let mut clips = Vec::with_capacity(cli.inputs.len());
    for (i, path) in cli.inputs.iter().enumerate() {
        let samples = PcmReader::open(path, config.sample_rate)?;
        let mut clip = PitchClip::new(clip_id(path), samples);
        if let Some(frames) = cli.frames.get(i) {
            let fps = cli.fps.unwrap_or(config.video.fps);
            clip = clip.with_frames(RawFrameFile::new(frames, cli.width, cli.height, fps));
        }
        clips.push(clip);
    }

    if cli.candidates {
        let detector = GlovePopDetector::new(config.pop.clone());
        let listing: Vec<_> = clips
            .iter()
            .map(|clip| (clip.id.clone(), detector.candidates(&clip.samples)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let analyzer = PitchAnalyzer::new(&config);
    let outcome = analyze_batch(&analyzer, &clips);
    for failure in &outcome.failures {
        eprintln!("{}: {}", failure.id, failure.error);
    }

    let typing = if cli.no_typing {
        None
    } else {
        let training = cli.training.as_deref().map(load_training).transpose()?;
        Some(assign_pitch_types(
            &outcome.analyses,
            training.as_deref(),
            &config.classifier,
        )?)
    };

    let reports = build_reports(&outcome.analyses, typing.as_ref());
    let bytes = export_reports(&reports, cli.format.into())?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
