// src/language_id.rs
//
// Statistical language identification behind a trait, plus the
// process-global reproducibility seed.

use crate::error::ClassifyError;
use std::sync::OnceLock;
use tracing::warn;
use whatlang::Lang;

pub const DEFAULT_SEED: u64 = 0;

static CLASSIFIER_SEED: OnceLock<u64> = OnceLock::new();

/// Fix the classifier seed for the whole process. The first call wins;
/// later calls with a different value keep the original and warn.
/// Returns the seed actually in effect.
pub fn seed_classifier(seed: u64) -> u64 {
    let applied = *CLASSIFIER_SEED.get_or_init(|| seed);
    if applied != seed {
        warn!(
            "Classifier seed already set to {}; ignoring {}",
            applied, seed
        );
    }
    applied
}

fn ensure_seeded() {
    CLASSIFIER_SEED.get_or_init(|| DEFAULT_SEED);
}

pub trait LanguageClassifier {
    /// Raw language code for a text snippet. The caller maps codes to
    /// reported names; this layer never formats output.
    fn classify(&self, text: &str) -> Result<String, ClassifyError>;
}

/// Trigram-based identification via whatlang. Deterministic, so the
/// seed only pins down the one-time-setup contract.
pub struct WhatlangClassifier;

impl LanguageClassifier for WhatlangClassifier {
    fn classify(&self, text: &str) -> Result<String, ClassifyError> {
        ensure_seeded();
        match whatlang::detect(text) {
            Some(info) => Ok(raw_code(info.lang())),
            None => Err(ClassifyError::Undetectable),
        }
    }
}

/// Normalize whatlang's ISO 639-3 space to the short codes the mapping
/// table speaks. whatlang reports Mandarin without a script split, so
/// it lands on the simplified code; anything unmapped passes its 639-3
/// code through to the fallback branch.
fn raw_code(lang: Lang) -> String {
    match lang {
        Lang::Eng => "en".to_string(),
        Lang::Fra => "fr".to_string(),
        Lang::Deu => "de".to_string(),
        Lang::Jpn => "ja".to_string(),
        Lang::Kor => "ko".to_string(),
        Lang::Rus => "ru".to_string(),
        Lang::Ara => "ar".to_string(),
        Lang::Cmn => "zh-cn".to_string(),
        other => other.code().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_code_mapping() {
        assert_eq!(raw_code(Lang::Eng), "en");
        assert_eq!(raw_code(Lang::Fra), "fr");
        assert_eq!(raw_code(Lang::Deu), "de");
        assert_eq!(raw_code(Lang::Jpn), "ja");
        assert_eq!(raw_code(Lang::Kor), "ko");
        assert_eq!(raw_code(Lang::Rus), "ru");
        assert_eq!(raw_code(Lang::Ara), "ar");
        assert_eq!(raw_code(Lang::Cmn), "zh-cn");
    }

    #[test]
    fn test_unmapped_language_passes_639_3_code() {
        assert_eq!(raw_code(Lang::Fin), "fin");
    }

    #[test]
    fn test_classifies_clear_english() {
        let classifier = WhatlangClassifier;
        let code = classifier
            .classify(
                "The quick brown fox jumps over the lazy dog and keeps \
                 running through the quiet morning fields.",
            )
            .unwrap();
        assert_eq!(code, "en");
    }

    #[test]
    fn test_seed_first_call_wins() {
        // Single test exercises both paths: the guard is process-global.
        let first = seed_classifier(DEFAULT_SEED);
        let second = seed_classifier(41);
        assert_eq!(first, second);
    }
}
