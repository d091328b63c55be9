// src/ocr/engine.rs
//
// One OCR engine: a detection session plus a language-group recognition
// session and its dictionary, loaded from the configured model
// directory by naming convention:
//
//   <models_dir>/det.onnx          shared detection model
//   <models_dir>/rec_<name>.onnx   per-group recognition model
//   <models_dir>/dict_<name>.txt   per-group character dictionary

use crate::config::OcrConfig;
use crate::error::ProviderError;
use crate::ocr::detector::TextDetector;
use crate::ocr::panel::EngineSpec;
use crate::ocr::provider::{TextProvider, TextSnippet};
use crate::ocr::recognizer::TextRecognizer;
use anyhow::{Context, Result};
use opencv::{core::Mat, imgcodecs, imgproc, prelude::*};
use ort::{
    execution_providers::CUDAExecutionProvider,
    session::{builder::GraphOptimizationLevel, Session},
};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Gpu,
    Cpu,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Gpu => "GPU",
            ExecutionMode::Cpu => "CPU",
        }
    }
}

pub struct OnnxTextProvider {
    name: String,
    detector: TextDetector,
    recognizer: TextRecognizer,
}

impl OnnxTextProvider {
    pub fn new(
        spec: &EngineSpec,
        config: &OcrConfig,
        mode: ExecutionMode,
    ) -> Result<Self, ProviderError> {
        let models_dir = Path::new(&config.models_dir);
        let det_path = models_dir.join("det.onnx");
        let rec_path = models_dir.join(format!("rec_{}.onnx", spec.name));
        let dict_path = models_dir.join(format!("dict_{}.txt", spec.name));

        info!(
            "Loading {} OCR engine ({}) for [{}]",
            spec.name,
            mode.as_str(),
            spec.languages.join(", ")
        );

        let det_session = build_session(&det_path, config.intra_threads, mode)
            .map_err(|e| ProviderError::Init(format!("{}: {}", det_path.display(), e)))?;
        let rec_session = build_session(&rec_path, config.intra_threads, mode)
            .map_err(|e| ProviderError::Init(format!("{}: {}", rec_path.display(), e)))?;
        let dictionary = load_dictionary(&dict_path)?;

        let recognizer = TextRecognizer::from_parts(rec_session, dictionary);
        info!(
            "✓ {} OCR engine ready ({} dictionary entries)",
            spec.name,
            recognizer.dictionary_len()
        );

        Ok(Self {
            name: spec.name.to_string(),
            detector: TextDetector::from_session(det_session),
            recognizer,
        })
    }
}

impl TextProvider for OnnxTextProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect_text(&mut self, image_path: &Path) -> Result<Vec<TextSnippet>, ProviderError> {
        let (rgb, width, height) =
            load_image(image_path).map_err(|e| ProviderError::Inference(e.to_string()))?;

        let boxes = self
            .detector
            .detect(&rgb, width, height)
            .map_err(|e| ProviderError::Inference(e.to_string()))?;

        let mut snippets = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            match self.recognizer.recognize(&rgb, width, height, &bbox) {
                Ok((text, confidence)) => {
                    if !text.is_empty() {
                        snippets.push(TextSnippet {
                            bbox,
                            text,
                            confidence,
                        });
                    }
                }
                Err(e) => debug!(
                    "Recognition failed on a region of {}: {}",
                    image_path.display(),
                    e
                ),
            }
        }

        Ok(snippets)
    }
}

fn build_session(model_path: &Path, intra_threads: usize, mode: ExecutionMode) -> Result<Session> {
    let mut session_builder = Session::builder()?;

    if mode == ExecutionMode::Gpu {
        // error_on_failure makes a missing CUDA runtime surface here
        // instead of silently running on CPU, so the caller's fallback
        // actually owns the decision.
        session_builder =
            session_builder.with_execution_providers([CUDAExecutionProvider::default()
                .with_device_id(0)
                .build()
                .error_on_failure()])?;
    }

    let session = session_builder
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(model_path)
        .context("Failed to load model")?;

    Ok(session)
}

fn load_dictionary(path: &Path) -> Result<Vec<String>, ProviderError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ProviderError::Init(format!("{}: {}", path.display(), e)))?;

    let dictionary: Vec<String> = contents.lines().map(|line| line.to_string()).collect();
    if dictionary.is_empty() {
        return Err(ProviderError::Init(format!(
            "{}: empty dictionary",
            path.display()
        )));
    }

    Ok(dictionary)
}

/// Decode an image file to packed RGB bytes.
fn load_image(path: &Path) -> Result<(Vec<u8>, usize, usize)> {
    let mat = imgcodecs::imread(path.to_str().unwrap_or_default(), imgcodecs::IMREAD_COLOR)?;
    if mat.empty() {
        anyhow::bail!("could not decode {}", path.display());
    }

    let mut rgb = Mat::default();
    imgproc::cvt_color(&mat, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

    let width = rgb.cols() as usize;
    let height = rgb.rows() as usize;
    let data = rgb.data_bytes()?.to_vec();

    Ok((data, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_execution_mode_labels() {
        assert_eq!(ExecutionMode::Gpu.as_str(), "GPU");
        assert_eq!(ExecutionMode::Cpu.as_str(), "CPU");
    }

    #[test]
    fn test_dictionary_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict_en.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "a").unwrap();
        writeln!(file, "b").unwrap();
        writeln!(file, "道").unwrap();

        let dictionary = load_dictionary(&path).unwrap();
        assert_eq!(dictionary, vec!["a", "b", "道"]);
    }

    #[test]
    fn test_missing_dictionary_is_init_error() {
        let dir = TempDir::new().unwrap();
        let err = load_dictionary(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ProviderError::Init(_)));
    }

    #[test]
    fn test_missing_model_is_init_error() {
        let dir = TempDir::new().unwrap();
        let spec = EngineSpec {
            name: "en",
            languages: &["en"],
        };
        let config = OcrConfig {
            frames_dir: String::new(),
            models_dir: dir.path().to_str().unwrap().to_string(),
            intra_threads: 1,
        };
        let err = OnnxTextProvider::new(&spec, &config, ExecutionMode::Cpu).unwrap_err();
        assert!(matches!(err, ProviderError::Init(_)));
    }
}
