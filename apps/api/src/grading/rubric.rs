use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_SCORE: u8 = 5;

/// The five rubric scores, each in 0..=5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricScores {
    pub clarity: u8,
    pub completeness: u8,
    pub actionability: u8,
    pub tone: u8,
    pub conciseness: u8,
}

impl RubricScores {
    /// Weighted total: content criteria count double, style criteria once. Max 40.
    pub fn total(&self) -> u32 {
        let content = u32::from(self.clarity)
            + u32::from(self.completeness)
            + u32::from(self.actionability);
        let style = u32::from(self.tone) + u32::from(self.conciseness);
        2 * content + style
    }
}

/// A single piece of model feedback. Order from the model is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub aspect: String,
    pub issue: String,
    pub fix: String,
}

/// Result of reading the model's `scores` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub scores: RubricScores,
    pub total: u32,
    /// Rubric fields that were missing or unreadable and fell back to 0.
    pub defaulted: Vec<&'static str>,
}

impl Aggregate {
    pub fn used_defaults(&self) -> bool {
        !self.defaulted.is_empty()
    }
}

/// Maps the parsed `scores` value onto `RubricScores` and computes the total.
///
/// Each field is coerced independently: integers are clamped to 0..=5, floats are
/// rounded then clamped, numeric strings are parsed. Anything else, including a
/// non-object `parsed_scores`, yields 0 for that field and is listed in `defaulted`.
pub fn aggregate(parsed_scores: &Value) -> Aggregate {
    let map = parsed_scores.as_object();
    let mut defaulted = Vec::new();

    let mut read = |field: &'static str| -> u8 {
        match map.and_then(|m| m.get(field)).and_then(coerce_score) {
            Some(score) => score,
            None => {
                defaulted.push(field);
                0
            }
        }
    };

    let scores = RubricScores {
        clarity: read("clarity"),
        completeness: read("completeness"),
        actionability: read("actionability"),
        tone: read("tone"),
        conciseness: read("conciseness"),
    };

    Aggregate {
        total: scores.total(),
        scores,
        defaulted,
    }
}

fn coerce_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8)
}

/// Reads the model's `feedback` array. Non-object entries are skipped; missing or
/// non-string fields become empty strings.
pub fn read_feedback(value: Option<&Value>) -> Vec<FeedbackItem> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            let text = |key: &str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            };
            FeedbackItem {
                aspect: text("aspect"),
                issue: text("issue"),
                fix: text("fix"),
            }
        })
        .collect()
}
