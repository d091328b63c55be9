// src/main.rs

mod config;
mod driving_side;
mod edge_detection;
mod error;
mod frame;
mod language_id;
mod languages;
mod ocr;
mod preprocessing;
mod video_processor;

use anyhow::Result;
use config::Config;
use driving_side::{SideClassifier, SideReport, SideVerdict};
use edge_detection::CannyEdgeDetector;
use language_id::{seed_classifier, WhatlangClassifier};
use ocr::{build_panel, default_panel, scan_directory, ScanReport};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use video_processor::{find_video_files, VideoFileSource};

#[derive(Debug, Serialize)]
struct VideoSummary {
    video: String,
    verdict: SideVerdict,
    left_score: u64,
    right_score: u64,
    frames_sampled: u32,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    driving_side: Vec<VideoSummary>,
    language_scan: Option<ScanReport>,
}

fn main() -> Result<()> {
    let config = Config::load("config.yaml")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("roadlens={},ort=warn", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🛣️  Road Scene Analyzer Starting");
    info!("✓ Configuration loaded");

    let seed = seed_classifier(config.classifier.seed);
    info!("Language classifier seeded ({})", seed);

    // ── Pipeline A: driving side per video ───────────────────────────────
    let side_classifier = SideClassifier::new(
        CannyEdgeDetector::new(config.video.canny_low, config.video.canny_high),
        config.video.frame_cap,
    );

    let videos = find_video_files(&config.video.input_dir)?;
    if videos.is_empty() {
        warn!("No video files found in {}", config.video.input_dir);
    }

    let mut side_summaries = Vec::with_capacity(videos.len());
    for (idx, video_path) in videos.iter().enumerate() {
        info!("\n========================================");
        info!(
            "Processing video {}/{}: {}",
            idx + 1,
            videos.len(),
            video_path.display()
        );

        let report = classify_video(&side_classifier, video_path);
        info!(
            "✓ {} → traffic drives on the {} (left={}, right={}, frames={})",
            video_path.display(),
            report.verdict,
            report.left_score,
            report.right_score,
            report.frames_sampled
        );

        side_summaries.push(VideoSummary {
            video: video_path.display().to_string(),
            verdict: report.verdict,
            left_score: report.left_score,
            right_score: report.right_score,
            frames_sampled: report.frames_sampled,
        });
    }

    // ── Pipeline B: languages across frame images ────────────────────────
    let mut panel = build_panel(&default_panel(), &config.ocr);
    if panel.is_empty() {
        warn!("No OCR engines available; the language scan will find nothing");
    }

    let lang_classifier = WhatlangClassifier;
    let scan = match scan_directory(
        Path::new(&config.ocr.frames_dir),
        &mut panel,
        &lang_classifier,
    ) {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Frame scan failed: {}", e);
            None
        }
    };

    // ── Summary ──────────────────────────────────────────────────────────
    info!("📊 Final Report:");
    info!("  Videos classified: {}", side_summaries.len());
    for summary in &side_summaries {
        info!("    {} → {}", summary.video, summary.verdict);
    }
    if let Some(ref report) = scan {
        if report.languages.is_empty() {
            info!("  Languages detected: none");
        } else {
            info!("  Languages detected: {}", report.languages.len());
            for tag in report.languages.iter() {
                info!("    {}", tag);
            }
        }
    }

    let summary = RunSummary {
        driving_side: side_summaries,
        language_scan: scan,
    };
    println!("{}", serde_json::to_string(&summary)?);

    Ok(())
}

/// A video that cannot be opened degrades to the zero-frame fallback
/// report instead of failing the batch.
fn classify_video(classifier: &SideClassifier<CannyEdgeDetector>, path: &Path) -> SideReport {
    match VideoFileSource::open(path) {
        Ok(mut source) => {
            let report = classifier.classify(&mut source);
            debug!(
                "Reader consumed {}/{} frames @ {:.1} FPS",
                source.frames_read(),
                source.total_frames(),
                source.fps()
            );
            report
        }
        Err(e) => {
            warn!(
                "Could not open {}: {}. Using fallback verdict.",
                path.display(),
                e
            );
            SideReport::default()
        }
    }
}
