//! CLI for body analysis from detected pose landmarks.
//!
//! Usage:
//!   percent-body <pose.json>                      # Human-readable output
//!   percent-body <pose.json> --json               # JSON output
//!   percent-body <pose.json> -o report.json       # Save to file
//!
//! The input file holds the detector output for one image:
//!
//! ```json
//! {
//!   "width": 1080,
//!   "height": 1920,
//!   "landmarks": { "left_shoulder": {"x": 0.61, "y": 0.28, "z": -0.1, "visibility": 0.98} },
//!   "clothing_color": [34, 52, 120],
//!   "skin_hsv": [14, 90, 170],
//!   "pelvic_tilt": "anterior"
//! }
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use percent_body::{
    analyze, AnalysisOptions, AnalysisReport, AnalyzerConfig, Appearance, BodyAnalysis,
    ClothingColor, Error, FrameContext, Gender, LandmarkSet, PelvicTilt, SizeGuide,
    SkinToneSample,
};
use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "percent-body")]
#[command(
    author,
    version,
    about = "Body measurements, posture and fit from pose landmarks",
    long_about = None
)]
struct Args {
    /// Pose landmarks JSON file
    #[arg(required = true)]
    input: PathBuf,

    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Size guide gender: male or female
    #[arg(short, long)]
    gender: Option<Gender>,

    /// Physical units per pixel
    #[arg(short, long)]
    scale: Option<f32>,

    /// Size guide JSON replacing the built-in one
    #[arg(long)]
    size_guide: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Detector output for one image.
#[derive(Deserialize)]
struct PoseInput {
    width: u32,
    height: u32,
    landmarks: LandmarkSet,
    #[serde(default)]
    clothing_color: Option<[u8; 3]>,
    #[serde(default)]
    skin_hsv: Option<[u8; 3]>,
    #[serde(default)]
    pelvic_tilt: Option<PelvicTilt>,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    input: String,
    width: u32,
    height: u32,
    gender: Gender,
    pixel_to_unit_ratio: f32,
    full_body: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    analysis: Option<AnalysisReport>,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => AnalyzerConfig::default(),
    };
    if let Some(gender) = args.gender {
        config.gender = gender;
    }
    if let Some(scale) = args.scale {
        config.pixel_to_unit_ratio = scale;
    }
    if let Some(path) = &args.size_guide {
        config.size_guide = Some(path.clone());
    }

    tracing::debug!(?config, "configuration resolved");

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {:?}", args.input))?;
    let pose: PoseInput = serde_json::from_str(&content)
        .with_context(|| format!("Invalid pose file {:?}", args.input))?;

    let frame = FrameContext::new(pose.width, pose.height, config.pixel_to_unit_ratio)?;
    let size_guide: SizeGuide = config.size_guide().context("Failed to load size guide")?;

    let mut options = AnalysisOptions::with_size_guide(size_guide);
    options.pelvic_tilt = pose.pelvic_tilt;
    options.appearance = Appearance {
        clothing_color: pose.clothing_color.map(ClothingColor::from_rgb),
        skin_tone: pose.skin_hsv.map(SkinToneSample::from_hsv),
    };

    let (analysis, error) = match analyze(&pose.landmarks, &frame, &options) {
        Ok(analysis) => (Some(analysis), None),
        Err(e @ Error::InsufficientVisibility { .. }) => (None, Some(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    let output_str = if args.json {
        let output = Output {
            input: args.input.display().to_string(),
            width: pose.width,
            height: pose.height,
            gender: config.gender,
            pixel_to_unit_ratio: config.pixel_to_unit_ratio,
            full_body: analysis.is_some(),
            error,
            analysis: analysis.as_ref().map(BodyAnalysis::report),
        };
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(args, &pose, analysis.as_ref(), error.as_deref())
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)
            .with_context(|| format!("Failed to write {:?}", path))?;
        if args.verbose {
            eprintln!("Output written to {:?}", path);
        }
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(
    args: &Args,
    pose: &PoseInput,
    analysis: Option<&BodyAnalysis>,
    error: Option<&str>,
) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "Input: {} ({}x{})\n",
        args.input.display(),
        pose.width,
        pose.height
    ));

    let Some(a) = analysis else {
        s.push_str(&format!("\nIncomplete pose: {}\n", error.unwrap_or("not a full body")));
        return s;
    };

    s.push_str(&format!("Visibility score: {:.2}\n", a.visibility_score));

    s.push_str("\nMeasurements:\n");
    for (kind, value) in a.measurements.iter() {
        s.push_str(&format!("  {:<15} {:>7.1}\n", kind.name(), value));
    }

    s.push_str("\nPosture:\n");
    match a.posture.shoulder_slope_deg {
        Some(slope) => s.push_str(&format!(
            "  Shoulders:    {:?} ({:+.1}°)\n",
            a.posture.shoulder_alignment, slope
        )),
        None => s.push_str(&format!("  Shoulders:    {:?}\n", a.posture.shoulder_alignment)),
    }
    s.push_str(&format!("  Spine:        {:?}\n", a.posture.posture_type));
    s.push_str(&format!("  Head forward: {:.3}\n", a.posture.head_forward_ratio));

    s.push_str("\nProportions:\n");
    match &a.proportions {
        Ok(p) => {
            s.push_str(&format!("  Torso/leg:     {:.2}\n", p.torso_leg_ratio));
            s.push_str(&format!("  Shoulder/hip:  {:.2}\n", p.shoulder_hip_ratio));
            s.push_str(&format!("  Body type:     {}\n", p.body_type));
        }
        Err(e) => s.push_str(&format!("  unavailable: {}\n", e)),
    }

    s.push_str("\nFlexibility:\n");
    for (label, score) in [("Shoulder", &a.shoulder_flexibility), ("Hip", &a.hip_flexibility)] {
        match score {
            Ok(v) => s.push_str(&format!("  {:<9} {:.0}/100\n", label, v)),
            Err(e) => s.push_str(&format!("  {:<9} unavailable: {}\n", label, e)),
        }
    }

    s.push_str("\nSize:\n");
    match &a.size {
        Ok(size) if size.regional_label != size.label => s.push_str(&format!(
            "  {} (US {}), off by {:.1}\n",
            size.label, size.regional_label, size.score
        )),
        Ok(size) => s.push_str(&format!("  {}, off by {:.1}\n", size.label, size.score)),
        Err(e) => s.push_str(&format!("  unavailable: {}\n", e)),
    }

    let recs = &a.recommendations;
    if !recs.is_empty() {
        s.push_str("\nRecommended cuts:\n");
        for (label, items) in [
            ("Tops", &recs.tops),
            ("Bottoms", &recs.bottoms),
            ("Dresses", &recs.dresses),
            ("Avoid", &recs.avoid),
        ] {
            if !items.is_empty() {
                s.push_str(&format!("  {:<8} {}\n", label, items.join(", ")));
            }
        }
        if let Some(why) = &recs.rationale {
            s.push_str(&format!("  Why:     {}\n", why));
        }
    }

    if let Some(color) = &a.appearance.clothing_color {
        s.push_str(&format!("\nClothing color: {} {:?}\n", color.name, color.rgb));
    }
    if let Some(skin) = &a.appearance.skin_tone {
        s.push_str(&format!("Skin tone: {}\n", skin.tone));
    }

    s
}
