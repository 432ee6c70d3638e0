//! CLI application for age estimation from detected faces.
//!
//! Usage:
//!   face-age faces.json                      # Human-readable output
//!   face-age faces.json --json               # JSON output
//!   face-age faces.json --image photo.jpg    # Crop faces from the photo
//!   face-age faces.json -o ages.json --json  # Save to file

use clap::{Parser, ValueEnum};
use face_age::{
    AgeEstimationResult, AgeEstimator, BoundingBox, DetectedFace, EstimationPath,
    EstimatorConfig, StrategyKind,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "face-age")]
#[command(author, version, about = "Facial age estimation from landmark geometry", long_about = None)]
struct Args {
    /// JSON file with detected faces
    #[arg(required = true)]
    faces: PathBuf,

    /// Source image to crop face regions from
    #[arg(long)]
    image: Option<PathBuf>,

    /// Estimator config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Estimation strategy (overrides config)
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Directory holding the learned age model (overrides config)
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StrategyArg {
    Landmarks,
    Learned,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Landmarks => StrategyKind::Landmarks,
            StrategyArg::Learned => StrategyKind::LearnedModel,
        }
    }
}

/// Accepted input layouts: a bare array or `{ "faces": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FacesInput {
    List(Vec<DetectedFace>),
    Wrapped { faces: Vec<DetectedFace> },
}

impl FacesInput {
    fn into_faces(self) -> Vec<DetectedFace> {
        match self {
            FacesInput::List(faces) | FacesInput::Wrapped { faces } => faces,
        }
    }
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    source: String,
    strategy: StrategyKind,
    faces_estimated: usize,
    faces: Vec<FaceOutput>,
}

#[derive(Serialize)]
struct FaceOutput {
    /// Face index (1-based)
    index: usize,
    bounding_box: BoundingBox,
    estimated_age: f32,
    rounded_age: u32,
    confidence: f32,
    age_range: [u32; 2],
    path: EstimationPath,
    /// Size of the face crop, when an image was given
    #[serde(skip_serializing_if = "Option::is_none")]
    crop_size: Option<[u32; 2]>,
    processing_time_us: u128,
}

fn main() {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> face_age::Result<()> {
    let mut config = match args.config {
        Some(ref path) => EstimatorConfig::load_or_default(path),
        None => EstimatorConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy.into());
    }
    if let Some(ref dir) = args.model_dir {
        config = config.with_model_dir(dir);
    }

    debug!("Reading faces from {:?}", args.faces);
    let content = std::fs::read_to_string(&args.faces)?;
    let faces = serde_json::from_str::<FacesInput>(&content)?.into_faces();
    info!("Loaded {} face(s)", faces.len());

    let estimator = AgeEstimator::new(config);

    let results = match args.image {
        Some(ref path) => {
            debug!("Loading image {:?}", path);
            let img = image::open(path)?;
            estimator.estimate_batch_in_image(&faces, &img)
        }
        None => estimator.estimate_batch(&faces),
    };

    let output = Output {
        source: args.faces.display().to_string(),
        strategy: estimator.strategy().kind(),
        faces_estimated: results.len(),
        faces: faces
            .iter()
            .zip(&results)
            .enumerate()
            .map(|(i, (face, result))| face_output(i, face, result))
            .collect(),
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        info!("Output written to {:?}", path);
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn face_output(i: usize, face: &DetectedFace, result: &AgeEstimationResult) -> FaceOutput {
    FaceOutput {
        index: i + 1,
        bounding_box: face.bounding_box,
        estimated_age: result.estimated_age,
        rounded_age: result.rounded_age(),
        confidence: result.confidence,
        age_range: [result.age_range_low, result.age_range_high],
        path: result.path,
        crop_size: result
            .face_image
            .as_ref()
            .map(|img| [img.width(), img.height()]),
        processing_time_us: result.processing_time.as_micros(),
    }
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!("Source: {}\n", output.source));
    s.push_str(&format!("Strategy: {:?}\n", output.strategy));
    s.push_str(&format!("Faces estimated: {}\n", output.faces_estimated));

    if output.faces.is_empty() {
        s.push_str("\nNo faces found.\n");
        return s;
    }

    for face in &output.faces {
        s.push_str(&format!("\n--- Face {} ---\n", face.index));
        s.push_str(&format!(
            "Bounding box: {:.2}x{:.2} at ({:.2}, {:.2})\n",
            face.bounding_box.width,
            face.bounding_box.height,
            face.bounding_box.x,
            face.bounding_box.y
        ));
        s.push_str(&format!(
            "Age:        {} ({:.1})\n",
            face.rounded_age, face.estimated_age
        ));
        s.push_str(&format!("Range:      {}-{}\n", face.age_range[0], face.age_range[1]));
        s.push_str(&format!("Confidence: {:.0}%\n", face.confidence * 100.0));
        let method = match face.path {
            EstimationPath::Landmarks => "landmark heuristic",
            EstimationPath::LearnedModel => "learned model",
            EstimationPath::Fallback => "fallback (no landmarks)",
        };
        s.push_str(&format!("Method:     {}\n", method));
        if let Some([w, h]) = face.crop_size {
            s.push_str(&format!("Crop:       {}x{} px\n", w, h));
        }
    }

    s
}
