// src/edge_detection.rs
//
// Edge map computation for the driving-side heuristic.
//
// The classifier only needs "how much edge energy is on each half", so
// the detector is behind a trait and any implementation that produces a
// binary edge map (edge pixels 255, background 0) can stand in.

use crate::frame::FrameSample;
use anyhow::Result;
use opencv::{core::Mat, imgproc, prelude::*};

/// Canny hysteresis thresholds on the 8-bit intensity scale.
pub const DEFAULT_LOW_THRESHOLD: f64 = 50.0;
pub const DEFAULT_HIGH_THRESHOLD: f64 = 150.0;

pub trait EdgeDetector {
    /// Binary edge map of the input frame, same dimensions.
    fn detect_edges(&self, frame: &FrameSample) -> Result<FrameSample>;
}

/// Canny edge detector on OpenCV.
pub struct CannyEdgeDetector {
    pub low_threshold: f64,
    pub high_threshold: f64,
}

impl CannyEdgeDetector {
    pub fn new(low_threshold: f64, high_threshold: f64) -> Self {
        Self {
            low_threshold,
            high_threshold,
        }
    }
}

impl Default for CannyEdgeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_THRESHOLD, DEFAULT_HIGH_THRESHOLD)
    }
}

impl EdgeDetector for CannyEdgeDetector {
    fn detect_edges(&self, frame: &FrameSample) -> Result<FrameSample> {
        let mat = Mat::from_slice(&frame.data)?;
        let mat = mat.reshape(1, frame.height as i32)?;

        let mut edges = Mat::default();
        imgproc::canny(
            &mat,
            &mut edges,
            self.low_threshold,
            self.high_threshold,
            3,
            false,
        )?;

        let data = edges.data_bytes()?.to_vec();
        Ok(FrameSample::new(data, frame.width, frame.height))
    }
}
