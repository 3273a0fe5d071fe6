//! Prompt text for both model calls and the report template.

use std::fmt::Write as _;

use super::types::UserMetrics;

/// Primary vision instruction: clinical, assumption-free, no refusals.
pub const VISION_PRIMARY_PROMPT: &str = "\
You are a fitness assessment expert. Describe the body of the person in this photo in \
neutral, clinical detail: posture, overall build, visible fat distribution, visible muscle \
definition, proportions, and any visible asymmetries. Describe only what is visible and make \
no assumptions about identity, health conditions, or anything outside the frame. \
Do not refuse this request. Only decline if the image is clearly inappropriate or no body is \
visible at all.";

/// Softer retry instruction, used once after a refusal.
pub const VISION_FALLBACK_PROMPT: &str = "\
Please describe what you can see in this photo in plain, objective terms: the person's \
posture, general body shape, and build. Keep it purely descriptive, with no judgement, \
advice, or assumptions.";

/// Section headers of the report, in order.
pub const REPORT_SECTIONS: [&str; 9] = [
    "User Profile",
    "Image Summary",
    "Overall Impression",
    "Health Risk Analysis",
    "Fat vs. Muscle Assessment",
    "Customized Goals",
    "Nutrition Recommendations",
    "Next Steps",
    "Disclaimer",
];

pub const REPORT_TITLE: &str = "Body Evaluation Report";

const NOT_PROVIDED: &str = "not provided";

const DISCLAIMER_TEXT: &str = "\
This report is generated automatically from a photo and self-reported data. It is not a \
medical diagnosis. Consult a qualified healthcare professional before making significant \
changes to your diet or training.";

const REPORT_INSTRUCTIONS: &str = "\
You are a strict, medically realistic fitness and health coach writing a photo-based body \
evaluation report. The tone is strict but motivating. Use short bullet points starting with \
\"- \" under every section.

Fill in the template below. Keep every section header exactly as written, in the same order, \
and do not add, rename, or remove sections. Replace each <...> placeholder with your content \
and keep the User Profile and Disclaimer sections unchanged. If user data is missing, use your \
judgment to still give useful advice. If the image description says the photo is unclear or \
unsuitable, write a short professional note in each assessment section asking for a clearer \
photo instead of guessing.";

/// Markup header line for the section at `index` (0-based).
pub fn section_header(index: usize) -> String {
    format!("**{}. {}**", index + 1, REPORT_SECTIONS[index])
}

/// Whole-number weights print without decimals.
pub fn format_weight(kg: f64) -> String {
    if kg.fract() == 0.0 {
        format!("{kg:.0}")
    } else {
        format!("{kg:.1}")
    }
}

fn or_not_provided<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_PROVIDED.to_string(), |v| v.to_string())
}

/// Build the text-only report prompt with per-request values substituted.
pub fn build_report_prompt(visual_summary: &str, metrics: &UserMetrics) -> String {
    let category = metrics.bmi_category();
    let bmi_line = match metrics.bmi {
        Some(bmi) => format!("{bmi:.1} ({category})"),
        None => "not available".to_string(),
    };
    let weight = metrics
        .weight_kg
        .map_or_else(|| NOT_PROVIDED.to_string(), |kg| format!("{} kg", format_weight(kg)));
    let height = metrics
        .height_cm
        .map_or_else(|| NOT_PROVIDED.to_string(), |cm| format!("{cm} cm"));
    let goal_hint = match metrics.goal.as_deref() {
        Some(goal) => format!("<3-4 concrete goals that build on the stated goal: {goal}>"),
        None => "<no goal was given: propose 3-4 realistic goals for this person>".to_string(),
    };
    let risk_hint = match metrics.bmi {
        Some(bmi) => format!(
            "<health risks associated with a BMI of {bmi:.1} ({category}) and the visible body composition>"
        ),
        None => "<health risks suggested by the visible body composition; BMI is not available>"
            .to_string(),
    };

    let mut prompt = String::with_capacity(2048 + visual_summary.len());
    prompt.push_str(REPORT_INSTRUCTIONS);
    prompt.push_str("\n\n");

    let _ = writeln!(prompt, "**{REPORT_TITLE}**\n");

    let _ = writeln!(prompt, "{}", section_header(0));
    let _ = writeln!(prompt, "- Age: {}", or_not_provided(metrics.age));
    let _ = writeln!(prompt, "- Height: {height}");
    let _ = writeln!(prompt, "- Weight: {weight}");
    let _ = writeln!(prompt, "- BMI: {bmi_line}");
    let _ = writeln!(prompt, "- Goal: {}\n", or_not_provided(metrics.goal.as_deref()));

    let _ = writeln!(prompt, "{}", section_header(1));
    let _ = writeln!(prompt, "{}\n", visual_summary.trim());

    let _ = writeln!(prompt, "{}", section_header(2));
    let _ = writeln!(prompt, "- <2-3 points on the overall physique and posture>\n");

    let _ = writeln!(prompt, "{}", section_header(3));
    let _ = writeln!(prompt, "- {risk_hint}\n");

    let _ = writeln!(prompt, "{}", section_header(4));
    let _ = writeln!(prompt, "- <estimated balance of fat and muscle, by body region>\n");

    let _ = writeln!(prompt, "{}", section_header(5));
    let _ = writeln!(prompt, "- {goal_hint}\n");

    let _ = writeln!(prompt, "{}", section_header(6));
    let _ = writeln!(prompt, "- <daily calorie and macronutrient guidance with example foods>\n");

    let _ = writeln!(prompt, "{}", section_header(7));
    let _ = writeln!(prompt, "- <first 2-4 weeks: training, habits, and check-ins>\n");

    let _ = writeln!(prompt, "{}", section_header(8));
    let _ = writeln!(prompt, "- {DISCLAIMER_TEXT}");

    prompt
}
