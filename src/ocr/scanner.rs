// src/ocr/scanner.rs
//
// Directory scan: each PNG in the frames directory goes through the
// whole engine panel; non-blank snippets go to the language classifier
// and the mapped names pool into one deduplicated set.
// Failures stay scoped: a provider error skips that provider for that
// image, a classification error skips that snippet.

use crate::error::ClassifyError;
use crate::language_id::LanguageClassifier;
use crate::languages::{DetectedLanguageSet, LanguageTag};
use crate::ocr::provider::{TextProvider, TextSnippet};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    pub languages: DetectedLanguageSet,
    pub images_scanned: usize,
    pub snippets_found: usize,
    pub snippets_classified: usize,
}

/// PNG files directly inside `dir` (no recursion), in filename order.
/// The extension match ignores case.
pub fn list_png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read frames directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png {
            files.push(path);
        }
    }

    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

pub fn scan_directory(
    dir: &Path,
    panel: &mut [Box<dyn TextProvider>],
    classifier: &dyn LanguageClassifier,
) -> Result<ScanReport> {
    let files = list_png_files(dir)?;
    info!("Found {} frame image(s) in {}", files.len(), dir.display());

    let mut report = ScanReport::default();

    for (idx, path) in files.iter().enumerate() {
        debug!(
            "Scanning image {}/{}: {}",
            idx + 1,
            files.len(),
            path.display()
        );

        let snippets = collect_snippets(path, panel);
        report.images_scanned += 1;
        report.snippets_found += snippets.len();

        if snippets.is_empty() {
            debug!("No text found in {}", path.display());
            continue;
        }

        for snippet in &snippets {
            let text = snippet.text.trim();
            if text.is_empty() {
                continue;
            }

            match classifier.classify(text) {
                Ok(code) => {
                    report.snippets_classified += 1;
                    let tag = LanguageTag::from_code(&code);
                    if report.languages.insert(tag.clone()) {
                        info!(
                            "New language: {} (from {:?}, confidence {:.2})",
                            tag, text, snippet.confidence
                        );
                    }
                }
                Err(ClassifyError::Undetectable) => debug!("Could not classify {:?}", text),
                Err(e) => warn!("Classifier failed on {:?}: {}", text, e),
            }
        }
    }

    info!(
        "Scan complete: {} image(s), {} snippet(s), {} classified, languages: [{}]",
        report.images_scanned,
        report.snippets_found,
        report.snippets_classified,
        report.languages.names().join(", ")
    );

    Ok(report)
}

/// Query every engine in panel order; snippets keep panel order, then
/// within-engine order. A failing engine is logged and skipped for this
/// image only.
fn collect_snippets(path: &Path, panel: &mut [Box<dyn TextProvider>]) -> Vec<TextSnippet> {
    let mut snippets = Vec::new();

    for provider in panel.iter_mut() {
        match provider.detect_text(path) {
            Ok(mut found) => {
                debug!(
                    "{}: {} snippet(s) in {}",
                    provider.name(),
                    found.len(),
                    path.display()
                );
                for snippet in &found {
                    debug!(
                        "  {:?} at {:?} ({:.2})",
                        snippet.text, snippet.bbox, snippet.confidence
                    );
                }
                snippets.append(&mut found);
            }
            Err(e) => warn!("⚠️  {} failed on {}: {}", provider.name(), path.display(), e),
        }
    }

    snippets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use std::cell::RefCell;
    use std::fs::File;
    use tempfile::TempDir;

    // ── Test doubles ──

    /// Returns the same snippets for every image.
    struct StubProvider {
        name: &'static str,
        texts: Vec<&'static str>,
    }

    impl TextProvider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }
        fn detect_text(&mut self, _path: &Path) -> Result<Vec<TextSnippet>, ProviderError> {
            Ok(self
                .texts
                .iter()
                .map(|t| TextSnippet {
                    bbox: [0.0, 0.0, 10.0, 10.0],
                    text: t.to_string(),
                    confidence: 0.9,
                })
                .collect())
        }
    }

    /// Returns snippets only for image paths containing its marker.
    struct PathKeyedProvider {
        marker: &'static str,
        text: &'static str,
    }

    impl TextProvider for PathKeyedProvider {
        fn name(&self) -> &str {
            "keyed"
        }
        fn detect_text(&mut self, path: &Path) -> Result<Vec<TextSnippet>, ProviderError> {
            if path.to_string_lossy().contains(self.marker) {
                Ok(vec![TextSnippet {
                    bbox: [0.0; 4],
                    text: self.text.to_string(),
                    confidence: 1.0,
                }])
            } else {
                Ok(Vec::new())
            }
        }
    }

    struct BrokenProvider;
    impl TextProvider for BrokenProvider {
        fn name(&self) -> &str {
            "broken"
        }
        fn detect_text(&mut self, _path: &Path) -> Result<Vec<TextSnippet>, ProviderError> {
            Err(ProviderError::Inference("engine crashed".into()))
        }
    }

    /// Classifies by first word, recording every call.
    struct RecordingClassifier {
        calls: RefCell<Vec<String>>,
    }

    impl RecordingClassifier {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl LanguageClassifier for RecordingClassifier {
        fn classify(&self, text: &str) -> Result<String, ClassifyError> {
            self.calls.borrow_mut().push(text.to_string());
            match text {
                t if t.starts_with("Hello") => Ok("en".to_string()),
                t if t.starts_with("Bonjour") => Ok("fr".to_string()),
                t if t.starts_with("Привет") => Ok("ru".to_string()),
                t if t.starts_with("??") => Err(ClassifyError::Undetectable),
                t if t.starts_with("!!") => Err(ClassifyError::Backend("engine exploded".into())),
                _ => Ok("xx".to_string()),
            }
        }
    }

    fn touch_pngs(dir: &TempDir, names: &[&str]) {
        for name in names {
            File::create(dir.path().join(name)).unwrap();
        }
    }

    // ── Listing ──

    #[test]
    fn test_list_only_pngs_case_insensitive_sorted() {
        let dir = TempDir::new().unwrap();
        touch_pngs(&dir, &["b.png", "A.PNG", "c.jpg", "d.txt"]);

        let files = list_png_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["A.PNG", "b.png"]);
    }

    #[test]
    fn test_list_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(list_png_files(&dir.path().join("absent")).is_err());
    }

    // ── Scanning ──

    #[test]
    fn test_empty_directory_yields_empty_set() {
        let dir = TempDir::new().unwrap();
        let mut panel: Vec<Box<dyn TextProvider>> = vec![Box::new(StubProvider {
            name: "stub",
            texts: vec!["Hello world"],
        })];
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        assert!(report.languages.is_empty());
        assert_eq!(report.images_scanned, 0);
        assert!(classifier.calls.borrow().is_empty());
    }

    #[test]
    fn test_whitespace_snippets_never_reach_the_classifier() {
        let dir = TempDir::new().unwrap();
        touch_pngs(&dir, &["frame.png"]);
        let mut panel: Vec<Box<dyn TextProvider>> = vec![Box::new(StubProvider {
            name: "stub",
            texts: vec!["   ", "\t\n", ""],
        })];
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        assert!(classifier.calls.borrow().is_empty());
        assert!(report.languages.is_empty());
        assert_eq!(report.snippets_found, 3);
        assert_eq!(report.snippets_classified, 0);
    }

    #[test]
    fn test_dedup_across_many_snippets_and_images() {
        let dir = TempDir::new().unwrap();
        let names: Vec<String> = (0..10).map(|i| format!("f{:02}.png", i)).collect();
        touch_pngs(&dir, &names.iter().map(|s| s.as_str()).collect::<Vec<_>>());

        let mut panel: Vec<Box<dyn TextProvider>> = vec![Box::new(StubProvider {
            name: "stub",
            texts: vec![
                "Hello one",
                "Hello two",
                "Bonjour ami",
                "Hello again",
                "Bonjour encore",
            ],
        })];
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        assert_eq!(report.snippets_found, 50);
        assert_eq!(report.snippets_classified, 50);
        assert_eq!(report.languages.names(), vec!["English", "French"]);
    }

    #[test]
    fn test_languages_appear_in_first_seen_image_order() {
        let dir = TempDir::new().unwrap();
        touch_pngs(&dir, &["a.png", "b.png"]);

        let mut panel: Vec<Box<dyn TextProvider>> = vec![
            Box::new(PathKeyedProvider {
                marker: "a.png",
                text: "Hello there",
            }),
            Box::new(PathKeyedProvider {
                marker: "b.png",
                text: "Bonjour monsieur",
            }),
        ];
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        assert_eq!(report.languages.names(), vec!["English", "French"]);
    }

    #[test]
    fn test_broken_provider_does_not_suppress_others() {
        let dir = TempDir::new().unwrap();
        touch_pngs(&dir, &["a.png", "b.png"]);

        let mut panel: Vec<Box<dyn TextProvider>> = vec![
            Box::new(BrokenProvider),
            Box::new(StubProvider {
                name: "stub",
                texts: vec!["Привет мир"],
            }),
        ];
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        // The healthy engine was consulted for both images
        assert_eq!(report.snippets_found, 2);
        assert_eq!(report.languages.names(), vec!["Russian"]);
    }

    #[test]
    fn test_undetectable_snippet_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        touch_pngs(&dir, &["a.png"]);

        let mut panel: Vec<Box<dyn TextProvider>> = vec![Box::new(StubProvider {
            name: "stub",
            texts: vec!["??", "Hello clear"],
        })];
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        assert_eq!(report.snippets_classified, 1);
        assert_eq!(report.languages.names(), vec!["English"]);
    }

    #[test]
    fn test_classifier_backend_error_skips_snippet() {
        let dir = TempDir::new().unwrap();
        touch_pngs(&dir, &["a.png"]);

        let mut panel: Vec<Box<dyn TextProvider>> = vec![Box::new(StubProvider {
            name: "stub",
            texts: vec!["!! broken", "Bonjour quand même"],
        })];
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        assert_eq!(report.snippets_classified, 1);
        assert_eq!(report.languages.names(), vec!["French"]);
    }

    #[test]
    fn test_unmapped_codes_keep_their_raw_form() {
        let dir = TempDir::new().unwrap();
        touch_pngs(&dir, &["a.png"]);

        let mut panel: Vec<Box<dyn TextProvider>> = vec![Box::new(StubProvider {
            name: "stub",
            texts: vec!["mystery writing"],
        })];
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        assert_eq!(report.languages.names(), vec!["Other (xx)"]);
    }

    #[test]
    fn test_empty_panel_scans_but_finds_nothing() {
        let dir = TempDir::new().unwrap();
        touch_pngs(&dir, &["a.png"]);

        let mut panel: Vec<Box<dyn TextProvider>> = Vec::new();
        let classifier = RecordingClassifier::new();

        let report = scan_directory(dir.path(), &mut panel, &classifier).unwrap();
        assert_eq!(report.images_scanned, 1);
        assert!(report.languages.is_empty());
    }
}
