//! CLI application for face shape classification.
//!
//! Usage:
//!   face-shape <image>                          # Human-readable output
//!   face-shape <image> --landmarks mesh.json    # Use extracted landmarks
//!   face-shape <image> --json -o result.json    # Save JSON to file

use clap::Parser;
use face_shape::{AnalysisResult, Analyzer, AnalyzerConfig, LandmarkSet, Tier};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "face-shape")]
#[command(author, version, about = "Face shape classification", long_about = None)]
struct Args {
    /// Input image file (JPEG or PNG)
    #[arg(required = true)]
    image: PathBuf,

    /// Face mesh landmarks as JSON: [[x, y, z], ...] or [{"x":..,"y":..,"z":..}, ...]
    #[arg(short, long)]
    landmarks: Option<PathBuf>,

    /// Analyzer configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => AnalyzerConfig::from_json_file(path)?,
        None => AnalyzerConfig::default(),
    };
    let analyzer = Analyzer::new(config)?;

    tracing::info!("Loading image {}", args.image.display());
    let image = std::fs::read(&args.image)?;

    let landmarks = match &args.landmarks {
        Some(path) => {
            tracing::info!("Loading landmarks {}", path.display());
            let text = std::fs::read_to_string(path)?;
            Some(serde_json::from_str::<LandmarkSet>(&text)?)
        }
        None => None,
    };

    let result = analyzer.analyze(&image, landmarks.as_ref())?;

    let output_str = if args.json {
        serde_json::to_string_pretty(&result)?
    } else {
        format_human_readable(&args.image.display().to_string(), &result)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        tracing::info!("Output written to {}", path.display());
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(image: &str, result: &AnalysisResult) -> String {
    let mut s = String::new();

    s.push_str(&format!("Image: {}\n", image));
    s.push_str(&format!(
        "Face shape: {} ({:.1}% confidence)\n",
        result.face_shape.display_name(),
        result.confidence * 100.0
    ));
    s.push_str(&format!("{}\n", result.description));

    let method = match result.tier() {
        Tier::Landmark => "landmark geometry",
        Tier::Heuristic => "image metadata heuristic",
        Tier::SafeDefault => "default (analysis unavailable)",
    };
    s.push_str(&format!("Method: {}\n", method));

    if let Some(m) = &result.measurements {
        s.push_str("\nMeasurements:\n");
        s.push_str(&format!("  Aspect ratio:    {:.3}\n", m.aspect_ratio));
        s.push_str(&format!("  Jawline angle:   {:.1}°\n", m.jawline_angle));
        s.push_str(&format!("  Face width:      {:.3}\n", m.face_width));
        s.push_str(&format!("  Face height:     {:.3}\n", m.face_height));
        s.push_str(&format!("  Jaw width:       {:.3}\n", m.jaw_width));
        s.push_str(&format!("  Cheekbone width: {:.3}\n", m.cheekbone_width));
        s.push_str(&format!("  Forehead width:  {:.3}\n", m.forehead_width));
        if let Some(count) = result.landmark_count {
            s.push_str(&format!("  Landmarks used:  {} points\n", count));
        }
    }

    if let Some(info) = &result.image_info {
        s.push_str(&format!(
            "\nImage: {}x{}, {} bytes\n",
            info.width, info.height, info.size
        ));
    }

    s
}
