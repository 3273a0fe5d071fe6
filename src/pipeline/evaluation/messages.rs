//! Fixed user-facing strings.

/// Returned (200) when the vision step still refuses after the fallback prompt.
pub const REFUSAL_ADVISORY: &str = "\
We couldn't analyze this photo. Please upload a clear, well-lit photo that shows \
your full body in fitted clothing, and try again.";

/// Returned (200) when the vision step fails at the provider level.
pub const VISION_UNAVAILABLE: &str = "\
Our image analysis service is temporarily unavailable. Please try again in a few minutes.";

/// Report body used when the report step fails at the provider level.
pub const REPORT_FALLBACK: &str = "\
We were unable to generate your evaluation report right now. Your photo was analyzed \
successfully; please try again shortly to receive the full report.";

pub const LIVENESS: &str = "Physique evaluation service is running";
