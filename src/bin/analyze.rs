// src/bin/analyze.rs
use anyhow::{Context, bail};
use clap::Parser;
use closet_colors::{
    capture::FileImageSource,
    client::{AnalysisClient, DEFAULT_BACKEND_URL},
    errors::FailureKind,
    inventory::{CATEGORIES, ClothingStore},
    models::ClothingItem,
    palette,
    services::{ImageProcessor, image_processor::TARGET_UPLOAD_WIDTH},
};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

/// Photograph stand-in: sends one garment image through the color analysis
/// proxy and prints the breakdown.
#[derive(Parser, Debug)]
#[command(name = "analyze", version)]
struct Args {
    /// Image file to analyze
    image: PathBuf,

    /// Base URL of the analysis proxy
    #[arg(long, env = "BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "CLIENT_TIMEOUT_SECS", default_value_t = 90)]
    timeout_secs: u64,

    /// Scale the image down to this width before upload
    #[arg(long, default_value_t = TARGET_UPLOAD_WIDTH)]
    width: u32,

    /// Also build a closet entry with this name from the result
    #[arg(long)]
    save_as: Option<String>,

    /// Category for --save-as
    #[arg(long, default_value = "shirt")]
    category: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let args = Args::parse();

    let client = AnalysisClient::new(&args.backend_url, Duration::from_secs(args.timeout_secs))?;
    let processor = ImageProcessor::with_target_width(args.width);
    let source = FileImageSource::new(&args.image);

    info!("Analyzing {} via {}", args.image.display(), client.endpoint());
    let result = match client.analyze_capture(source, processor).await {
        Ok(result) => result,
        Err(e) => match e.kind() {
            FailureKind::Input => bail!("could not analyze this image: {}", e),
            FailureKind::Service => bail!("color analysis service failed: {}", e),
            FailureKind::Cancelled => bail!("analysis cancelled"),
            FailureKind::Rejected => bail!("analysis not started: {}", e),
        },
    };
    client.take_outcome();

    println!("Color Analysis");
    for (row, line) in result.colors().into_iter().zip(result.render_lines()) {
        match palette::nearest(row.hex) {
            Some(swatch) if swatch != row.hex => println!("  {}  ~ {}", line, swatch),
            _ => println!("  {}", line),
        }
    }
    if let Some(description) = &result.description {
        println!("  {}", description);
    }

    if let Some(name) = args.save_as {
        if !CATEGORIES.contains(&args.category.as_str()) {
            bail!("category must be one of: {}", CATEGORIES.join(", "));
        }
        let item = ClothingItem::from_analysis(
            name,
            args.category,
            Some(args.image.display().to_string()),
            &result,
        );
        let mut closet = ClothingStore::new();
        closet.add(item.clone())?;
        println!(
            "{}",
            serde_json::to_string_pretty(&item).context("failed to serialize item")?
        );
    }

    Ok(())
}
