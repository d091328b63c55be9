// src/ocr/mod.rs
//
// Multi-engine OCR orchestration.
//
// Signal flow:
//   scanner → panel (engines) → detector (text boxes) → recognizer (snippets)
//           → language_id (raw codes) → languages (reported set)
//
// Each engine is a detection+recognition pair specialized for one
// language group; the scanner queries every engine per image and pools
// the snippets.

pub mod detector;
pub mod engine;
pub mod panel;
pub mod provider;
pub mod recognizer;
pub mod scanner;

// Re-exports for ergonomic access from main.rs
pub use engine::{ExecutionMode, OnnxTextProvider};
pub use panel::{build_panel, default_panel, EngineSpec};
pub use provider::{TextProvider, TextSnippet};
pub use scanner::{scan_directory, ScanReport};
