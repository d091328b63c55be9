// src/config.rs

use crate::driving_side::DEFAULT_FRAME_CAP;
use crate::edge_detection::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use crate::language_id::DEFAULT_SEED;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub video: VideoConfig,
    pub ocr: OcrConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    pub input_dir: String,
    pub frame_cap: u32,
    pub canny_low: f64,
    pub canny_high: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    pub frames_dir: String,
    pub models_dir: String,
    pub intra_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path))?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video: VideoConfig::default(),
            ocr: OcrConfig::default(),
            classifier: ClassifierConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input_dir: "videos".to_string(),
            frame_cap: DEFAULT_FRAME_CAP,
            canny_low: DEFAULT_LOW_THRESHOLD,
            canny_high: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            frames_dir: "frames".to_string(),
            models_dir: "models/ocr".to_string(),
            intra_threads: 2,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
