//! Substring-based refusal detection.
//!
//! Known imprecision: a legitimate description that happens to contain a
//! marker ("the left arm cannot be seen") is classified as a refusal. The
//! only consequence is one extra fallback call, which is accepted.

use super::types::RefusalClassifier;

/// Default markers, lower-case.
pub const DEFAULT_REFUSAL_MARKERS: &[&str] = &[
    "i'm sorry",
    "i am sorry",
    "i apologize",
    "cannot",
    "can't",
    "unable to",
];

/// Lower-cases the response and looks for any marker as a substring.
#[derive(Debug, Clone)]
pub struct KeywordRefusalDetector {
    markers: Vec<String>,
}

impl KeywordRefusalDetector {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for KeywordRefusalDetector {
    fn default() -> Self {
        Self::new(DEFAULT_REFUSAL_MARKERS.iter().copied())
    }
}

impl RefusalClassifier for KeywordRefusalDetector {
    fn is_refusal(&self, text: &str) -> bool {
        // Models often answer with a typographic apostrophe ("I’m sorry").
        let normalized = text.to_lowercase().replace('\u{2019}', "'");
        self.markers.iter().any(|m| normalized.contains(m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_apology() {
        let d = KeywordRefusalDetector::default();
        assert!(d.is_refusal("I'm sorry, but I can't help with that."));
    }

    #[test]
    fn detection_is_case_insensitive() {
        let d = KeywordRefusalDetector::default();
        assert!(d.is_refusal("I CANNOT describe this image."));
    }

    #[test]
    fn typographic_apostrophe_is_normalized() {
        let d = KeywordRefusalDetector::default();
        assert!(d.is_refusal("I\u{2019}m sorry, I won\u{2019}t do that."));
    }

    #[test]
    fn neutral_description_is_accepted() {
        let d = KeywordRefusalDetector::default();
        assert!(!d.is_refusal(
            "Adult standing upright, moderate abdominal fat, visible shoulder definition."
        ));
    }

    #[test]
    fn legitimate_cannot_is_a_known_false_positive() {
        let d = KeywordRefusalDetector::default();
        assert!(d.is_refusal("The lower legs cannot be seen because of the crop."));
    }

    #[test]
    fn custom_markers_replace_defaults() {
        let d = KeywordRefusalDetector::new(["NOPE", ""]);
        assert_eq!(d.markers(), &["nope".to_string()]);
        assert!(d.is_refusal("nope."));
        assert!(!d.is_refusal("I'm sorry"));
    }
}
