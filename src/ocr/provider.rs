// src/ocr/provider.rs

use crate::error::ProviderError;
use std::path::Path;

/// One recognized text region from one engine on one image.
#[derive(Debug, Clone)]
pub struct TextSnippet {
    /// [x1, y1, x2, y2] in original image coordinates
    pub bbox: [f32; 4],
    pub text: String,
    pub confidence: f32,
}

/// An OCR engine. Inference needs `&mut self` because the underlying
/// runtime sessions do.
pub trait TextProvider {
    fn name(&self) -> &str;

    /// All text snippets found in the image. An error here is scoped to
    /// this image; the provider must stay usable for the next one.
    fn detect_text(&mut self, image_path: &Path) -> Result<Vec<TextSnippet>, ProviderError>;
}
