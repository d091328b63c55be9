// src/ocr/panel.rs
//
// The engine panel: a fixed, ordered list of language-group engines.
// Construction prefers GPU and retries each engine on CPU; an engine
// that fails both is dropped for the run without touching the others.

use crate::config::OcrConfig;
use crate::ocr::engine::{ExecutionMode, OnnxTextProvider};
use crate::ocr::provider::TextProvider;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EngineSpec {
    pub name: &'static str,
    /// Language group the recognition model covers. Every group carries
    /// "en" so Latin auxiliary text next to non-Latin scripts is read.
    pub languages: &'static [&'static str],
}

/// The stock panel: one engine per major script, plus one for the
/// Latin languages of interest.
pub fn default_panel() -> Vec<EngineSpec> {
    vec![
        EngineSpec {
            name: "ch_tra",
            languages: &["ch_tra", "en"],
        },
        EngineSpec {
            name: "ch_sim",
            languages: &["ch_sim", "en"],
        },
        EngineSpec {
            name: "ja",
            languages: &["ja", "en"],
        },
        EngineSpec {
            name: "ko",
            languages: &["ko", "en"],
        },
        EngineSpec {
            name: "ru",
            languages: &["ru", "en"],
        },
        EngineSpec {
            name: "ar",
            languages: &["ar", "en"],
        },
        EngineSpec {
            name: "latin",
            languages: &["fr", "de", "en"],
        },
    ]
}

/// Build every engine in panel order with the uniform GPU-then-CPU
/// policy. The panel that comes back may be shorter than requested,
/// never reordered.
pub fn build_panel(specs: &[EngineSpec], config: &OcrConfig) -> Vec<Box<dyn TextProvider>> {
    let mut panel: Vec<Box<dyn TextProvider>> = Vec::with_capacity(specs.len());

    for spec in specs {
        match OnnxTextProvider::new(spec, config, ExecutionMode::Gpu) {
            Ok(engine) => panel.push(Box::new(engine)),
            Err(e) => {
                warn!(
                    "⚠️  {} engine failed on GPU: {}. Retrying on CPU.",
                    spec.name, e
                );
                match OnnxTextProvider::new(spec, config, ExecutionMode::Cpu) {
                    Ok(engine) => panel.push(Box::new(engine)),
                    Err(e) => warn!(
                        "⚠️  {} engine unavailable on CPU: {}. Dropped from panel.",
                        spec.name, e
                    ),
                }
            }
        }
    }

    info!("OCR panel ready: {}/{} engine(s)", panel.len(), specs.len());
    panel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_panel_has_seven_engines() {
        assert_eq!(default_panel().len(), 7);
    }

    #[test]
    fn test_every_engine_carries_the_auxiliary_language() {
        for spec in default_panel() {
            assert!(
                spec.languages.contains(&"en"),
                "{} is missing the auxiliary language",
                spec.name
            );
        }
    }

    #[test]
    fn test_engine_names_are_unique_and_ordered() {
        let panel = default_panel();
        let names: Vec<&str> = panel.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["ch_tra", "ch_sim", "ja", "ko", "ru", "ar", "latin"]
        );
    }
}
