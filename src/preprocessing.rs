// src/preprocessing.rs

use anyhow::Result;

/// Prepare an RGB image for the text detection model:
/// resize, ImageNet-normalize, convert HWC -> CHW.
pub fn imagenet_tensor(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Result<Vec<f32>> {
    let resized = resize_bilinear(src, src_width, src_height, dst_width, dst_height);

    const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
    const STD: [f32; 3] = [0.229, 0.224, 0.225];

    let mut output = vec![0.0f32; 3 * dst_height * dst_width];

    for c in 0..3 {
        for h in 0..dst_height {
            for w in 0..dst_width {
                let hwc_idx = (h * dst_width + w) * 3 + c;
                let chw_idx = c * dst_height * dst_width + h * dst_width + w;

                let pixel = resized[hwc_idx] as f32 / 255.0;
                output[chw_idx] = (pixel - MEAN[c]) / STD[c];
            }
        }
    }

    Ok(output)
}

/// Prepare an RGB crop for the text recognition model:
/// map [0, 255] to [-1, 1], convert HWC -> CHW. No resize here;
/// the recognizer lays the crop out on its fixed-width canvas first.
pub fn centered_tensor(src: &[u8], width: usize, height: usize) -> Vec<f32> {
    let mut output = vec![0.0f32; 3 * height * width];

    for c in 0..3 {
        for h in 0..height {
            for w in 0..width {
                let hwc_idx = (h * width + w) * 3 + c;
                let chw_idx = c * height * width + h * width + w;

                let pixel = src[hwc_idx] as f32 / 255.0;
                output[chw_idx] = (pixel - 0.5) / 0.5;
            }
        }
    }

    output
}

/// Bilinear image resize (3-channel packed bytes)
pub fn resize_bilinear(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Vec<u8> {
    let mut dst = vec![0u8; dst_h * dst_w * 3];

    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx as f32 * x_ratio;
            let sy = dy as f32 * y_ratio;

            let sx0 = sx.floor() as usize;
            let sy0 = sy.floor() as usize;
            let sx1 = (sx0 + 1).min(src_w - 1);
            let sy1 = (sy0 + 1).min(src_h - 1);

            let fx = sx - sx0 as f32;
            let fy = sy - sy0 as f32;

            for c in 0..3 {
                let p00 = src[(sy0 * src_w + sx0) * 3 + c] as f32;
                let p10 = src[(sy0 * src_w + sx1) * 3 + c] as f32;
                let p01 = src[(sy1 * src_w + sx0) * 3 + c] as f32;
                let p11 = src[(sy1 * src_w + sx1) * 3 + c] as f32;

                let val = p00 * (1.0 - fx) * (1.0 - fy)
                    + p10 * fx * (1.0 - fy)
                    + p01 * (1.0 - fx) * fy
                    + p11 * fx * fy;

                dst[(dy * dst_w + dx) * 3 + c] = val.round() as u8;
            }
        }
    }

    dst
}

/// Cut a bounding box out of an RGB image. Coordinates are clamped to the
/// image; returns None when the clamped region is degenerate.
pub fn crop_rgb(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    bbox: &[f32; 4],
) -> Option<(Vec<u8>, usize, usize)> {
    if src_w == 0 || src_h == 0 {
        return None;
    }

    let x0 = (bbox[0].floor().max(0.0) as usize).min(src_w - 1);
    let y0 = (bbox[1].floor().max(0.0) as usize).min(src_h - 1);
    let x1 = (bbox[2].ceil().max(0.0) as usize).min(src_w);
    let y1 = (bbox[3].ceil().max(0.0) as usize).min(src_h);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let (crop_w, crop_h) = (x1 - x0, y1 - y0);
    let mut crop = Vec::with_capacity(crop_w * crop_h * 3);

    for y in y0..y1 {
        let row_start = (y * src_w + x0) * 3;
        crop.extend_from_slice(&src[row_start..row_start + crop_w * 3]);
    }

    Some((crop, crop_w, crop_h))
}
