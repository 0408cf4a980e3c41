//! Sentence splitting using the seams library (dialog-aware).

use log::warn;
use seams::sentence_detector::dialog_detector::SentenceDetectorDialog;
use std::sync::OnceLock;

/// Shared detector instance (lazy initialization). `None` if it failed to build.
static DETECTOR: OnceLock<Option<SentenceDetectorDialog>> = OnceLock::new();

/// Get or initialize the sentence detector.
fn get_detector() -> Option<&'static SentenceDetectorDialog> {
    DETECTOR
        .get_or_init(|| match SentenceDetectorDialog::new() {
            Ok(detector) => Some(detector),
            Err(e) => {
                warn!("Sentence detector unavailable, falling back to whole-text sentences: {:?}", e);
                None
            }
        })
        .as_ref()
}

/// Split text into sentences using the seams library for dialog-aware splitting.
///
/// Never fails: if detection is unavailable or errors, the whole trimmed text
/// is returned as a single sentence. Whitespace-only input yields nothing.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let Some(detector) = get_detector() else {
        return vec![trimmed.to_string()];
    };

    match detector.detect_sentences_borrowed(text) {
        Ok(sentences) => {
            let sentences: Vec<String> = sentences
                .iter()
                .map(|s| s.normalize().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if sentences.is_empty() {
                vec![trimmed.to_string()]
            } else {
                sentences
            }
        }
        Err(e) => {
            warn!("Sentence detection failed, using whole text: {:?}", e);
            vec![trimmed.to_string()]
        }
    }
}
