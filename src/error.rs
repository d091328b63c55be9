// src/error.rs
//
// Recoverable failure taxonomy for the pluggable collaborators. These
// are the errors callers are expected to match on and degrade from;
// everything else travels as anyhow at the application seams.

use thiserror::Error;

// ============================================================================
// OCR PROVIDERS
// ============================================================================

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Engine construction failed (model, dictionary or runtime setup).
    #[error("engine init failed: {0}")]
    Init(String),

    /// A constructed engine failed on one image. The engine itself
    /// stays usable for later images.
    #[error("inference failed: {0}")]
    Inference(String),
}

// ============================================================================
// LANGUAGE CLASSIFICATION
// ============================================================================

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Input too short or ambiguous for a statistical decision.
    #[error("language could not be determined")]
    Undetectable,

    /// Any other failure out of a classifier implementation.
    #[allow(dead_code)]
    #[error("language backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failure() {
        let init = ProviderError::Init("missing model".into());
        assert_eq!(init.to_string(), "engine init failed: missing model");

        let undetectable = ClassifyError::Undetectable;
        assert_eq!(
            undetectable.to_string(),
            "language could not be determined"
        );
    }
}
