// src/ocr/detector.rs
//
// Text detection stage: a DB-style model emits a per-pixel text
// probability map; thresholding and connected components turn it into
// bounding boxes in original image coordinates.

use crate::preprocessing;
use anyhow::Result;
use ort::session::Session;
use tracing::debug;

/// Model input edge (square), a multiple of 32 as the backbone expects.
pub const DET_INPUT_SIZE: usize = 640;
/// Probability above which a map pixel counts as text.
pub const DET_PROB_THRESHOLD: f32 = 0.3;
/// Components smaller than this many map pixels are noise.
pub const DET_MIN_AREA: usize = 12;
/// Detected regions are grown by this factor; the map marks shrunken
/// text cores, not full glyph extents.
pub const DET_BOX_EXPAND: f32 = 1.4;

pub struct TextDetector {
    session: Session,
}

impl TextDetector {
    pub(crate) fn from_session(session: Session) -> Self {
        Self { session }
    }

    /// Text region boxes for an RGB image, in reading order.
    pub fn detect(&mut self, rgb: &[u8], width: usize, height: usize) -> Result<Vec<[f32; 4]>> {
        let input =
            preprocessing::imagenet_tensor(rgb, width, height, DET_INPUT_SIZE, DET_INPUT_SIZE)?;
        let prob_map = self.infer(&input)?;
        let boxes = probability_map_to_boxes(&prob_map, width, height);
        debug!("Detected {} text region(s)", boxes.len());
        Ok(boxes)
    }

    fn infer(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let shape = [1, 3, DET_INPUT_SIZE, DET_INPUT_SIZE];
        let input_value =
            ort::value::Value::from_array((shape.as_slice(), input.to_vec().into_boxed_slice()))?;

        let outputs = self.session.run(ort::inputs!["x" => input_value])?;
        let output = &outputs[0];
        let (_, data) = output.try_extract_tensor::<f32>()?;

        Ok(data.to_vec())
    }
}

/// Threshold the probability map, find components, grow and rescale the
/// surviving boxes to image coordinates, and order them for reading.
fn probability_map_to_boxes(prob_map: &[f32], img_w: usize, img_h: usize) -> Vec<[f32; 4]> {
    let mask = binarize(prob_map, DET_PROB_THRESHOLD);
    let components = connected_components(&mask, DET_INPUT_SIZE, DET_INPUT_SIZE, DET_MIN_AREA);

    let scale_x = img_w as f32 / DET_INPUT_SIZE as f32;
    let scale_y = img_h as f32 / DET_INPUT_SIZE as f32;

    let mut boxes: Vec<[f32; 4]> = components
        .into_iter()
        .map(|[x0, y0, x1, y1]| {
            let grown = expand_box(
                [x0 as f32, y0 as f32, (x1 + 1) as f32, (y1 + 1) as f32],
                DET_INPUT_SIZE as f32,
                DET_INPUT_SIZE as f32,
                DET_BOX_EXPAND,
            );
            [
                grown[0] * scale_x,
                grown[1] * scale_y,
                grown[2] * scale_x,
                grown[3] * scale_y,
            ]
        })
        .collect();

    sort_reading_order(&mut boxes);
    boxes
}

pub(crate) fn binarize(prob_map: &[f32], threshold: f32) -> Vec<u8> {
    prob_map
        .iter()
        .map(|&p| if p > threshold { 1 } else { 0 })
        .collect()
}

/// 4-connected components of a binary mask. Returns inclusive pixel
/// bounds [x0, y0, x1, y1] of each component with at least `min_area`
/// pixels.
pub(crate) fn connected_components(
    mask: &[u8],
    width: usize,
    height: usize,
    min_area: usize,
) -> Vec<[usize; 4]> {
    let mut visited = vec![false; mask.len()];
    let mut boxes = Vec::new();
    let mut queue = Vec::new();

    for start in 0..mask.len() {
        if mask[start] == 0 || visited[start] {
            continue;
        }

        let (mut x0, mut y0) = (start % width, start / width);
        let (mut x1, mut y1) = (x0, y0);
        let mut area = 0usize;

        visited[start] = true;
        queue.push(start);

        while let Some(idx) = queue.pop() {
            let (x, y) = (idx % width, idx / width);
            area += 1;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);

            let mut push = |nidx: usize| {
                if mask[nidx] != 0 && !visited[nidx] {
                    visited[nidx] = true;
                    queue.push(nidx);
                }
            };

            if x > 0 {
                push(idx - 1);
            }
            if x + 1 < width {
                push(idx + 1);
            }
            if y > 0 {
                push(idx - width);
            }
            if y + 1 < height {
                push(idx + width);
            }
        }

        if area >= min_area {
            boxes.push([x0, y0, x1, y1]);
        }
    }

    boxes
}

/// Scale a box around its center, clamped to the frame.
pub(crate) fn expand_box(bbox: [f32; 4], max_w: f32, max_h: f32, ratio: f32) -> [f32; 4] {
    let (cx, cy) = ((bbox[0] + bbox[2]) / 2.0, (bbox[1] + bbox[3]) / 2.0);
    let half_w = (bbox[2] - bbox[0]) * ratio / 2.0;
    let half_h = (bbox[3] - bbox[1]) * ratio / 2.0;

    [
        (cx - half_w).max(0.0),
        (cy - half_h).max(0.0),
        (cx + half_w).min(max_w),
        (cy + half_h).min(max_h),
    ]
}

/// Top-to-bottom, then left-to-right.
pub(crate) fn sort_reading_order(boxes: &mut [[f32; 4]]) {
    boxes.sort_by(|a, b| {
        (a[1], a[0])
            .partial_cmp(&(b[1], b[0]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
