//! Deviation tiers and the human-readable commentary built from them

use rand::Rng;
use serde::Serialize;

/// Percentage points of drift still considered in line with history
pub const DEVIATION_THRESHOLD: f64 = 5.0;

pub const NO_CATEGORY_NOTICE: &str =
    "Forecast reflects total moves for the branch, with no move type specified.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviationTier {
    Consistent,
    Stronger,
    Weaker,
}

impl DeviationTier {
    /// Classify `current - historical`
    pub fn classify(current: f64, historical: f64) -> Self {
        let diff = current - historical;
        if diff.abs() <= DEVIATION_THRESHOLD {
            DeviationTier::Consistent
        } else if diff > DEVIATION_THRESHOLD {
            DeviationTier::Stronger
        } else {
            DeviationTier::Weaker
        }
    }
}

const DAY_CONSISTENT: [&str; 3] = [
    "Demand for {category} moves aligns closely with historical patterns (historical avg {hist}%, current {current}%).",
    "{category} move demand is in line with past trends (historical avg {hist}%, current {current}%).",
    "Expected {category} moves are consistent with historical data (historical avg {hist}%, current {current}%).",
];
const DAY_STRONGER: [&str; 3] = [
    "Demand for {category} moves is higher than historical trends (historical avg {hist}%, current {current}%).",
    "{category} move demand exceeds past patterns (historical avg {hist}%, current {current}%).",
    "Projected {category} moves show stronger demand than historical norms (historical avg {hist}%, current {current}%).",
];
const DAY_WEAKER: [&str; 3] = [
    "Demand for {category} moves is lower than historical trends (historical avg {hist}%, current {current}%).",
    "{category} move demand is below past trends (historical avg {hist}%, current {current}%).",
    "Expected {category} moves are weaker compared to historical data (historical avg {hist}%, current {current}%).",
];

const SUMMARY_CONSISTENT: [&str; 3] = [
    "This period's {category} move demand in {branch} aligns with historical averages ({current}% this period vs. {hist}% historically).",
    "{category} moves in {branch} for this period are consistent with past trends ({current}% this period vs. {hist}% historically).",
    "The demand for {category} moves in {branch} this period matches historical patterns ({current}% this period vs. {hist}% historically).",
];
const SUMMARY_STRONGER: [&str; 3] = [
    "This period's {category} move demand in {branch} is stronger than historical averages ({current}% this period vs. {hist}% historically).",
    "{category} moves in {branch} show higher demand this period compared to past years ({current}% this period vs. {hist}% historically).",
    "Demand for {category} moves in {branch} is elevated this period relative to historical trends ({current}% this period vs. {hist}% historically).",
];
const SUMMARY_WEAKER: [&str; 3] = [
    "This period's {category} move demand in {branch} is lower than historical averages ({current}% this period vs. {hist}% historically).",
    "{category} moves in {branch} are below historical trends for this period ({current}% this period vs. {hist}% historically).",
    "Demand for {category} moves in {branch} is weaker this period compared to past years ({current}% this period vs. {hist}% historically).",
];

pub fn day_phrases(tier: DeviationTier) -> &'static [&'static str] {
    match tier {
        DeviationTier::Consistent => &DAY_CONSISTENT,
        DeviationTier::Stronger => &DAY_STRONGER,
        DeviationTier::Weaker => &DAY_WEAKER,
    }
}

pub fn summary_phrases(tier: DeviationTier) -> &'static [&'static str] {
    match tier {
        DeviationTier::Consistent => &SUMMARY_CONSISTENT,
        DeviationTier::Stronger => &SUMMARY_STRONGER,
        DeviationTier::Weaker => &SUMMARY_WEAKER,
    }
}

/// Chooses among equivalent phrasings
pub trait PhrasePicker: Send + Sync {
    /// Index in `0..choices`; `choices` is never zero
    fn pick(&self, choices: usize) -> usize;
}

pub struct RandomPicker;

impl PhrasePicker for RandomPicker {
    fn pick(&self, choices: usize) -> usize {
        rand::thread_rng().gen_range(0..choices.max(1))
    }
}

/// Always the same position, wrapped to the number of choices
pub struct FixedPicker(pub usize);

impl PhrasePicker for FixedPicker {
    fn pick(&self, choices: usize) -> usize {
        self.0 % choices.max(1)
    }
}

/// Fill placeholders in one left-to-right pass. Substituted text is never
/// rescanned, and unknown placeholders are kept verbatim.
fn render(template: &str, category: &str, branch: &str, historical: f64, current: f64) -> String {
    let mut out = String::with_capacity(template.len() + category.len() + branch.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        let close = open + len;
        out.push_str(&rest[..open]);
        match &rest[open + 1..close] {
            "category" => out.push_str(category),
            "branch" => out.push_str(branch),
            "hist" => out.push_str(&format!("{:.1}", historical)),
            "current" => out.push_str(&format!("{:.1}", current)),
            _ => out.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Per-day commentary comparing the implied percentage with history
pub fn day_comment(
    category: &str,
    historical: f64,
    current: f64,
    picker: &dyn PhrasePicker,
) -> (DeviationTier, String) {
    let tier = DeviationTier::classify(current, historical);
    let phrases = day_phrases(tier);
    let template = phrases[picker.pick(phrases.len()) % phrases.len()];
    (tier, render(template, category, "", historical, current))
}

/// Window-level commentary naming the branch
pub fn summary_comment(
    category: &str,
    branch: &str,
    historical: f64,
    current: f64,
    picker: &dyn PhrasePicker,
) -> (DeviationTier, String) {
    let tier = DeviationTier::classify(current, historical);
    let phrases = summary_phrases(tier);
    let template = phrases[picker.pick(phrases.len()) % phrases.len()];
    (tier, render(template, category, branch, historical, current))
}

pub fn no_category_summary(branch: &str) -> String {
    format!(
        "This forecast reflects total moves for {} over the period, with no move type specified.",
        branch
    )
}
