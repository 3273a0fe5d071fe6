//! Metric extraction from free text.
//!
//! Loose natural-language patterns, case-insensitive. Each key keeps the
//! first in-range match in pattern priority order; anything not found is
//! `None`. Pure function of the input.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::types::UserMetrics;

const KG_PER_POUND: f64 = 0.453_592_37;

const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=120;
const HEIGHT_CM_RANGE: std::ops::RangeInclusive<u32> = 50..=272;
const WEIGHT_KG_RANGE: std::ops::RangeInclusive<f64> = 20.0..=400.0;

/// Trailing unit that disqualifies a number from being an age ("user is 180cm",
/// "I'm 6'2", "I'm 25% body fat"). A bare "in" is not a unit ("I'm 30 in good shape").
const UNIT_SUFFIX: &str =
    r#"(?P<unit>\s*(?:cm|centim|met|m\b|kg|kilo|lb|pound|ft\b|feet|foot|inch(?:es)?\b|'|"|%|\x{2019}|\x{201D}))?"#;

fn pattern(raw: &str) -> Regex {
    Regex::new(raw).unwrap_or_else(|e| panic!("invalid metric pattern {raw:?}: {e}"))
}

static AGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(&format!(r"(?i)\buser\s+is\s+(?P<value>\d{{1,3}}(?:\.\d+)?)\b{UNIT_SUFFIX}")),
        pattern(&format!(r"(?i)\b(?:i\s+am|i'm|im)\s+(?P<value>\d{{1,3}}(?:\.\d+)?)\b{UNIT_SUFFIX}")),
        pattern(r"(?i)\baged?\s*(?:is|:|=)?\s*(?P<value>\d{1,3})\b"),
        pattern(r"(?i)\b(?P<value>\d{1,3})\s*-?\s*(?:years?[\s-]*old|yrs?[\s-]*old|years\s+of\s+age|yo|y/o)\b"),
    ]
});

static HEIGHT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(r"(?i)\b(?P<value>\d{2,3}(?:\.\d+)?)\s*(?P<unit>cm|centimet(?:er|re)s?)\b"),
        pattern(r"(?i)\b(?P<value>[12]\.\d{1,2})\s*(?P<unit>m|meters?|metres?)\b"),
        pattern(r"(?i)\b(?:height|tall)\s*(?:is|:|=|of)?\s*(?P<value>\d{1,3}(?:\.\d+)?)\s*(?P<unit>cm|m)?\b"),
    ]
});

static WEIGHT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(r"(?i)\bweigh(?:s|ing|t)?\s*(?:is|:|=|of|about|around|roughly)?\s*(?P<value>\d{2,3}(?:\.\d+)?)\s*(?P<unit>kgs?|kilo(?:gram)?s?|lbs?|pounds?)?\b"),
        pattern(r"(?i)\b(?P<value>\d{2,3}(?:\.\d+)?)\s*(?P<unit>kgs?|kilo(?:gram)?s?|lbs?|pounds?)\b"),
    ]
});

static GOAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        pattern(r"(?i)\b(?:my\s+)?goal\s*(?:is|:|=)?\s*(?:to\s+)?(?P<value>(?:[^.;\n]|\.\d){3,120})"),
        pattern(r"(?i)\bi\s+(?:want|would\s+like|hope|plan)\s+to\s+(?P<value>(?:[^.;\n]|\.\d){3,120})"),
    ]
});

/// Extract age, height, weight, goal and derived BMI from user text.
pub fn extract_metrics(text: &str) -> UserMetrics {
    let age = extract_age(text);
    let height_cm = extract_height_cm(text);
    let weight_kg = extract_weight_kg(text);
    let goal = extract_goal(text);

    UserMetrics {
        age,
        height_cm,
        weight_kg,
        bmi: compute_bmi(height_cm, weight_kg),
        goal,
    }
}

/// `weight / (height/100)^2`, rounded to one decimal.
pub fn compute_bmi(height_cm: Option<u32>, weight_kg: Option<f64>) -> Option<f64> {
    let (height_cm, weight_kg) = (height_cm?, weight_kg?);
    if height_cm == 0 {
        return None;
    }
    let height_m = f64::from(height_cm) / 100.0;
    Some(round_one_decimal(weight_kg / (height_m * height_m)))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn first_match<T>(
    patterns: &[Regex],
    text: &str,
    mut accept: impl FnMut(&Captures<'_>) -> Option<T>,
) -> Option<T> {
    patterns
        .iter()
        .find_map(|re| re.captures_iter(text).find_map(|caps| accept(&caps)))
}

fn unit_of(caps: &Captures<'_>) -> Option<String> {
    caps.name("unit")
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|u| !u.is_empty())
}

fn extract_age(text: &str) -> Option<u32> {
    first_match(&AGE_PATTERNS, text, |caps| {
        if unit_of(caps).is_some() {
            return None;
        }
        let value: u32 = caps.name("value")?.as_str().parse().ok()?;
        AGE_RANGE.contains(&value).then_some(value)
    })
}

fn extract_height_cm(text: &str) -> Option<u32> {
    first_match(&HEIGHT_PATTERNS, text, |caps| {
        let value: f64 = caps.name("value")?.as_str().parse().ok()?;
        let in_metres = match unit_of(caps).as_deref() {
            Some(unit) => unit.starts_with('m'),
            None => value < 3.0,
        };
        let cm = if in_metres { value * 100.0 } else { value };
        let cm = cm.round() as u32;
        HEIGHT_CM_RANGE.contains(&cm).then_some(cm)
    })
}

fn extract_weight_kg(text: &str) -> Option<f64> {
    first_match(&WEIGHT_PATTERNS, text, |caps| {
        let value: f64 = caps.name("value")?.as_str().parse().ok()?;
        let kg = match unit_of(caps).as_deref() {
            Some(unit) if unit.starts_with("lb") || unit.starts_with("pound") => {
                round_one_decimal(value * KG_PER_POUND)
            }
            _ => value,
        };
        WEIGHT_KG_RANGE.contains(&kg).then_some(kg)
    })
}

fn extract_goal(text: &str) -> Option<String> {
    first_match(&GOAL_PATTERNS, text, |caps| {
        let goal = caps.name("value")?.as_str().trim().trim_end_matches(',').trim();
        (!goal.is_empty()).then(|| goal.to_string())
    })
}
