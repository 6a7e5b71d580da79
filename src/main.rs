use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use photo_scan::config::config::{DEFAULT_ENDPOINT, DEFAULT_JPEG_QUALITY, DEFAULT_TIMEOUT_SECS};
use photo_scan::{
    DisplayRow, HttpRecognitionClient, ImageNormalizer, ScanConfig, ScanSession, ScanSink,
    ScanStatus, SelectedImage, StatusView, telemetry,
};
use scan_scale::presets::DEFAULT_MAX_LONG_SIDE;
use tracing::info;

/// Photo recognition client:
/// - shrinks the photo locally so the longest side fits the limit
/// - uploads it to the recognition endpoint
/// - prints the recognized items with confidence scores
#[derive(Parser, Debug)]
#[command(name = "scan")]
#[command(about = "📷 Recognize the items in a photo")]
#[command(long_about = "Shrink a photo locally, upload it to a recognition endpoint and print the
recognized items with their confidence. Redirect responses are reported as a login requirement.")]
struct Args {
    /// Photo to scan
    #[arg(help = "Image file to scan (JPEG, PNG, WebP, ...)")]
    image: Option<PathBuf>,

    /// Recognition endpoint
    #[arg(short, long, env = "PHOTO_SCAN_ENDPOINT", default_value = DEFAULT_ENDPOINT,
          help = "Recognition endpoint URL receiving the multipart upload")]
    endpoint: String,

    /// Longest side after normalization
    #[arg(short, long, env = "PHOTO_SCAN_MAX_DIMENSION", default_value_t = DEFAULT_MAX_LONG_SIDE,
          help = "Largest width or height in pixels sent to the server")]
    max_dimension: u32,

    /// JPEG quality of re-encoded photos
    #[arg(short, long, env = "PHOTO_SCAN_QUALITY", default_value_t = DEFAULT_JPEG_QUALITY,
          help = "JPEG quality (1-100) used when a photo is downscaled")]
    quality: u8,

    /// Request timeout
    #[arg(short, long, env = "PHOTO_SCAN_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS,
          help = "Seconds to wait for the recognition server")]
    timeout: u64,

    /// Normalize only
    #[arg(long, help = "Normalize the photo and report what would be uploaded, without uploading")]
    dry_run: bool,

    /// Keep the upload payload
    #[arg(long, value_name = "PATH", help = "Write the normalized payload to PATH")]
    save_normalized: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, help = "Enable debug logging on stderr")]
    verbose: bool,
}

/// Plays the page: status line with badge, error line and result list on stdout.
struct ConsoleSink;

impl ScanSink for ConsoleSink {
    fn status_changed(&mut self, view: &StatusView) {
        match &view.badge {
            Some(badge) => println!("{} [{}]", view.message, badge),
            None => println!("{}", view.message),
        }
        if let Some(error) = &view.error {
            println!("  ! {}", error);
        }
    }

    fn results_changed(&mut self, rows: &[DisplayRow]) {
        for row in rows {
            println!("  - {}", row);
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    telemetry::init_tracing(args.verbose)?;

    let config = ScanConfig::new(args.endpoint, args.max_dimension, args.quality, args.timeout);
    config.validate().map_err(anyhow::Error::msg)?;

    let selected = args
        .image
        .as_deref()
        .map(SelectedImage::from_path)
        .transpose()?;

    if let Some(image) = &selected {
        if args.dry_run || args.save_normalized.is_some() {
            let normalized = ImageNormalizer::from_config(&config)
                .normalize_async(image.clone())
                .await;
            println!(
                "{}: {} ({}, {} bytes)",
                normalized.name,
                normalized.outcome,
                normalized.content_type,
                normalized.len()
            );

            if let Some(path) = &args.save_normalized {
                std::fs::write(path, normalized.data.as_slice())
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            if args.dry_run {
                return Ok(ExitCode::SUCCESS);
            }
        }
    }

    let client = HttpRecognitionClient::new(&config)?;
    info!(endpoint = %client.endpoint(), "recognition endpoint");
    let session = ScanSession::new(&config, client, ConsoleSink);

    let status = match selected {
        Some(image) => session.scan_image(image).await?,
        None => session.scan().await?,
    };
    Ok(exit_code(status))
}

fn exit_code(status: ScanStatus) -> ExitCode {
    match status {
        ScanStatus::Success => ExitCode::SUCCESS,
        ScanStatus::Idle => ExitCode::from(2),
        ScanStatus::Scanning | ScanStatus::Error => ExitCode::FAILURE,
    }
}
