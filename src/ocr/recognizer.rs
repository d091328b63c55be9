// src/ocr/recognizer.rs
//
// Text recognition stage: crops flow through a CTC sequence model and
// greedy decoding against the engine's character dictionary.

use crate::preprocessing;
use anyhow::Result;
use ort::session::Session;

/// Fixed recognition input height.
pub const REC_HEIGHT: usize = 48;
/// Canvas width; wider crops are squeezed, narrower ones right-padded.
pub const REC_MAX_WIDTH: usize = 320;

pub struct TextRecognizer {
    session: Session,
    dictionary: Vec<String>,
}

impl TextRecognizer {
    pub(crate) fn from_parts(session: Session, dictionary: Vec<String>) -> Self {
        Self { session, dictionary }
    }

    pub fn dictionary_len(&self) -> usize {
        self.dictionary.len()
    }

    /// Recognize the text inside one detected box. Degenerate crops
    /// come back as empty text with zero confidence.
    pub fn recognize(
        &mut self,
        rgb: &[u8],
        width: usize,
        height: usize,
        bbox: &[f32; 4],
    ) -> Result<(String, f32)> {
        let Some((crop, crop_w, crop_h)) = preprocessing::crop_rgb(rgb, width, height, bbox)
        else {
            return Ok((String::new(), 0.0));
        };

        let input = prepare_canvas(&crop, crop_w, crop_h);
        let (steps, classes, probs) = self.infer(&input)?;

        Ok(ctc_decode(&probs, steps, classes, &self.dictionary))
    }

    fn infer(&mut self, input: &[f32]) -> Result<(usize, usize, Vec<f32>)> {
        let shape = [1, 3, REC_HEIGHT, REC_MAX_WIDTH];
        let input_value =
            ort::value::Value::from_array((shape.as_slice(), input.to_vec().into_boxed_slice()))?;

        let outputs = self.session.run(ort::inputs!["x" => input_value])?;
        let output = &outputs[0];
        let (out_shape, data) = output.try_extract_tensor::<f32>()?;

        if out_shape.len() != 3 {
            anyhow::bail!("unexpected recognizer output shape {:?}", out_shape);
        }

        Ok((out_shape[1] as usize, out_shape[2] as usize, data.to_vec()))
    }
}

/// Scale the crop to the model height keeping aspect, lay it out on the
/// left of a black fixed-size canvas, and normalize to [-1, 1].
pub(crate) fn prepare_canvas(crop: &[u8], crop_w: usize, crop_h: usize) -> Vec<f32> {
    let scaled_w = ((crop_w as f32 * REC_HEIGHT as f32 / crop_h.max(1) as f32).round() as usize)
        .clamp(1, REC_MAX_WIDTH);
    let resized = preprocessing::resize_bilinear(crop, crop_w, crop_h, scaled_w, REC_HEIGHT);

    let mut canvas = vec![0u8; REC_HEIGHT * REC_MAX_WIDTH * 3];
    for y in 0..REC_HEIGHT {
        let src_start = y * scaled_w * 3;
        let dst_start = y * REC_MAX_WIDTH * 3;
        canvas[dst_start..dst_start + scaled_w * 3]
            .copy_from_slice(&resized[src_start..src_start + scaled_w * 3]);
    }

    preprocessing::centered_tensor(&canvas, REC_MAX_WIDTH, REC_HEIGHT)
}

/// Greedy CTC decode: per step take the best class, collapse repeats,
/// drop blanks (class 0). Dictionary entry i maps to class i + 1.
/// Confidence is the mean probability of the kept steps.
pub(crate) fn ctc_decode(
    probs: &[f32],
    steps: usize,
    classes: usize,
    dictionary: &[String],
) -> (String, f32) {
    let mut text = String::new();
    let mut kept = Vec::new();
    let mut prev_class = 0usize;

    for t in 0..steps {
        let row = &probs[t * classes..(t + 1) * classes];
        let (class, prob) = argmax(row);

        if class != 0 && class != prev_class {
            if let Some(ch) = dictionary.get(class - 1) {
                text.push_str(ch);
                kept.push(prob);
            }
        }
        prev_class = class;
    }

    let confidence = if kept.is_empty() {
        0.0
    } else {
        kept.iter().sum::<f32>() / kept.len() as f32
    };

    (text, confidence)
}

fn argmax(row: &[f32]) -> (usize, f32) {
    let mut best = (0usize, f32::MIN);
    for (i, &v) in row.iter().enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }
    best
}
