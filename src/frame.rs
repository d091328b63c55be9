// src/frame.rs
//
// Single-channel frame buffer shared by the driving-side pipeline.
//
// Both sampled video frames and the edge maps computed from them use
// this representation. It has zero dependency on OpenCV so the scoring
// logic stays testable with synthetic data.

/// Grayscale frame, row-major: pixel at (x, y) = data[y * width + x].
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl FrameSample {
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self { data, width, height }
    }

    /// Iterate rows as contiguous slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.width)
    }
}

/// Synthetic-frame constructors shared by tests across the crate.
#[cfg(test)]
impl FrameSample {
    pub fn filled(value: u8, width: usize, height: usize) -> Self {
        Self::new(vec![value; width * height], width, height)
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }
}
