// src/driving_side.rs
//
// Which side of the road does traffic drive on?
//
// Heuristic: in dashcam footage the roadside with oncoming traffic,
// signage and road furniture carries more high-frequency detail. Edge
// energy is summed per frame half over a short initial sample of the
// video; the heavier half names the driving side.

use crate::edge_detection::EdgeDetector;
use crate::frame::FrameSample;
use crate::video_processor::FrameSource;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Frames examined per video. Early frames are enough; the asymmetry
/// is a property of the scene, not of any single moment.
pub const DEFAULT_FRAME_CAP: u32 = 20;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SideVerdict {
    Left,
    Right,
}

impl SideVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            SideVerdict::Left => "left",
            SideVerdict::Right => "right",
        }
    }
}

impl std::fmt::Display for SideVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-half edge intensity accumulators. Only ever added to.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeScore {
    pub left: u64,
    pub right: u64,
}

impl EdgeScore {
    /// Fold one edge map into the totals. The left half takes the extra
    /// column when the width is odd.
    pub fn accumulate(&mut self, edges: &FrameSample) {
        if edges.width == 0 {
            return;
        }
        let split = edges.width.div_ceil(2);
        for row in edges.rows() {
            for &px in &row[..split] {
                self.left += px as u64;
            }
            for &px in &row[split..] {
                self.right += px as u64;
            }
        }
    }

    /// `Left` only on a strict majority; ties (including the no-signal
    /// 0/0 case) fall back to `Right`.
    pub fn verdict(&self) -> SideVerdict {
        if self.left > self.right {
            SideVerdict::Left
        } else {
            SideVerdict::Right
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SideReport {
    pub verdict: SideVerdict,
    pub left_score: u64,
    pub right_score: u64,
    pub frames_sampled: u32,
}

impl Default for SideReport {
    /// The report for a video that yielded no frames: the documented
    /// fallback verdict, not a detected signal.
    fn default() -> Self {
        Self {
            verdict: SideVerdict::Right,
            left_score: 0,
            right_score: 0,
            frames_sampled: 0,
        }
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct SideClassifier<D: EdgeDetector> {
    detector: D,
    frame_cap: u32,
}

impl<D: EdgeDetector> SideClassifier<D> {
    pub fn new(detector: D, frame_cap: u32) -> Self {
        Self { detector, frame_cap }
    }

    /// Sample up to `frame_cap` frames and score them. Total: read and
    /// edge-detect failures degrade to whatever was accumulated so far.
    pub fn classify(&self, source: &mut dyn FrameSource) -> SideReport {
        let (width, height) = source.dimensions();
        debug!(
            "Sampling up to {} frames of {}x{}",
            self.frame_cap, width, height
        );

        let mut score = EdgeScore::default();
        let mut frames_sampled = 0u32;

        while frames_sampled < self.frame_cap {
            match source.read_frame() {
                Ok(Some(frame)) => {
                    frames_sampled += 1;
                    match self.detector.detect_edges(&frame) {
                        Ok(edges) => score.accumulate(&edges),
                        Err(e) => {
                            warn!("Edge detection failed on frame {}: {}", frames_sampled, e)
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        "Frame read failed after {} frame(s): {}. Stopping sample.",
                        frames_sampled, e
                    );
                    break;
                }
            }
        }

        let verdict = score.verdict();
        info!(
            "Side verdict: {} (left={}, right={}, frames={})",
            verdict, score.left, score.right, frames_sampled
        );

        SideReport {
            verdict,
            left_score: score.left,
            right_score: score.right,
            frames_sampled,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
