//! Feedback Parsing
//!
//! The generator is asked for a JSON object with `scores`, `strengths` and
//! `improvements`, but nothing forces it to comply. A response is first
//! classified as structured or raw, then collapsed into a single
//! [`FeedbackRecord`] shape with rubric defaults filling any gaps. Any JSON
//! object counts as structured; scores are kept as the generator sent them
//! and only numeric ones are averaged. A response that is not valid JSON is
//! never an error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Score axes the prompts ask for. Generators may return others.
pub const CANONICAL_AXES: [&str; 4] = ["clarity", "technical_depth", "relevance", "confidence"];

/// The outcome of one feedback request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub scores: BTreeMap<String, Value>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// The untouched response text; only set when structured parsing failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// The fields of a feedback object. Missing, null or mistyped fields decode
/// as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StructuredFeedback {
    #[serde(default, deserialize_with = "lenient_scores")]
    pub scores: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub improvements: Vec<String>,
}

fn lenient_scores<'de, D: Deserializer<'de>>(de: D) -> Result<BTreeMap<String, Value>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    })
}

/// A list of notes; a lone string counts as a one-item list.
fn lenient_list<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(text) => Some(text),
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(text) if !text.trim().is_empty() => vec![text],
        _ => Vec::new(),
    })
}

/// A generator response, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFeedback {
    Structured(StructuredFeedback),
    Raw(String),
}

impl ParsedFeedback {
    /// Decodes `response` as a JSON object; anything else is kept raw.
    pub fn parse(response: &str) -> Self {
        match serde_json::from_str::<StructuredFeedback>(response) {
            Ok(structured) => Self::Structured(structured),
            Err(_) => Self::Raw(response.to_string()),
        }
    }

    /// Collapses into a record, replacing an empty strengths or improvements
    /// list wholesale with the given defaults.
    pub fn into_record(
        self,
        strength_defaults: &[String],
        improvement_defaults: &[String],
    ) -> FeedbackRecord {
        let mut record = match self {
            Self::Structured(s) => FeedbackRecord {
                scores: s.scores,
                strengths: s.strengths,
                improvements: s.improvements,
                raw: None,
            },
            Self::Raw(text) => FeedbackRecord {
                raw: Some(text),
                ..FeedbackRecord::default()
            },
        };

        if record.strengths.is_empty() {
            record.strengths = strength_defaults.to_vec();
        }
        if record.improvements.is_empty() {
            record.improvements = improvement_defaults.to_vec();
        }
        record
    }
}

impl FeedbackRecord {
    /// True when the generator's response could not be parsed.
    pub fn is_raw(&self) -> bool {
        self.raw.is_some()
    }

    /// Plain-text rendering for terminals and summary prompts.
    pub fn render(&self) -> String {
        let mut out = String::from("Feedback:");
        if !self.scores.is_empty() {
            let mut parts: Vec<String> = CANONICAL_AXES
                .iter()
                .map(|axis| match self.scores.get(*axis) {
                    Some(score) => format!("{axis}: {}", score_text(score)),
                    None => format!("{axis}: -"),
                })
                .collect();
            parts.extend(
                self.scores
                    .iter()
                    .filter(|(axis, _)| !CANONICAL_AXES.contains(&axis.as_str()))
                    .map(|(axis, score)| format!("{axis}: {}", score_text(score))),
            );
            let _ = write!(out, "\n - {}", parts.join(" | "));
        }
        if !self.strengths.is_empty() {
            let _ = write!(out, "\n - strengths: {}", self.strengths.join("; "));
        }
        if !self.improvements.is_empty() {
            let _ = write!(out, "\n - improvements: {}", self.improvements.join("; "));
        }
        if let Some(raw) = &self.raw {
            let _ = write!(out, "\n - notes: {raw}");
        }
        out
    }
}

fn score_text(score: &Value) -> String {
    match score {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Per-axis mean over a sequence of records. A record that lacks an axis, or
/// whose score for it is not a number, does not count toward that axis's mean.
pub fn average_scores<'a>(records: impl IntoIterator<Item = &'a FeedbackRecord>) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, (f64, u32)> = BTreeMap::new();
    for record in records {
        for (axis, score) in &record.scores {
            let Some(score) = score.as_f64() else {
                continue;
            };
            let entry = totals.entry(axis.clone()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }
    totals
        .into_iter()
        .map(|(axis, (sum, count))| (axis, sum / f64::from(count)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strengths() -> Vec<String> {
        vec!["You stayed on topic.".to_string()]
    }

    fn improvements() -> Vec<String> {
        vec!["Give a concrete example.".to_string(), "Name trade-offs.".to_string()]
    }

    fn record_for(response: &str) -> FeedbackRecord {
        ParsedFeedback::parse(response).into_record(&strengths(), &improvements())
    }

    #[test]
    fn test_prose_response_degrades_to_raw() {
        let record = record_for("not json");
        assert!(record.scores.is_empty());
        assert_eq!(record.strengths, strengths());
        assert_eq!(record.improvements, improvements());
        assert_eq!(record.raw.as_deref(), Some("not json"));
    }

    #[test]
    fn test_partial_structured_response_is_filled_from_rubric() {
        let record =
            record_for(r#"{"scores":{"clarity":4},"strengths":["clear"],"improvements":[]}"#);
        assert_eq!(record.scores, BTreeMap::from([("clarity".to_string(), json!(4))]));
        assert_eq!(record.strengths, vec!["clear".to_string()]);
        assert_eq!(record.improvements, improvements());
        assert_eq!(record.raw, None);
    }

    #[test]
    fn test_empty_response_still_has_guidance() {
        let record = record_for("");
        assert_eq!(record.raw.as_deref(), Some(""));
        assert!(!record.strengths.is_empty());
        assert!(!record.improvements.is_empty());
    }

    #[test]
    fn test_null_fields_are_treated_as_missing() {
        let record = record_for(r#"{"scores":null,"strengths":null}"#);
        assert!(record.scores.is_empty());
        assert_eq!(record.strengths, strengths());
        assert_eq!(record.improvements, improvements());
        assert!(!record.is_raw());
    }

    #[test]
    fn test_non_object_json_is_raw() {
        assert!(record_for("[1, 2, 3]").is_raw());
        assert!(record_for("\"great answer\"").is_raw());
    }

    #[test]
    fn test_non_canonical_axes_are_kept() {
        let record = record_for(r#"{"scores":{"storytelling":3.5}}"#);
        assert_eq!(record.scores.get("storytelling"), Some(&json!(3.5)));
    }

    #[test]
    fn test_non_numeric_scores_keep_the_response_structured() {
        let record = record_for(
            r#"{"scores":{"clarity":"4/5","relevance":null},"strengths":["clear"],"improvements":["depth"]}"#,
        );
        assert_eq!(record.raw, None);
        assert_eq!(record.strengths, vec!["clear".to_string()]);
        assert_eq!(record.improvements, vec!["depth".to_string()]);
        assert_eq!(record.scores.get("clarity"), Some(&json!("4/5")));
        assert!(record.render().contains("clarity: 4/5 |"));
    }

    #[test]
    fn test_mistyped_fields_decode_leniently() {
        let record = record_for(r#"{"scores":7,"strengths":"Good pacing.","improvements":{"a":1}}"#);
        assert!(!record.is_raw());
        assert!(record.scores.is_empty());
        assert_eq!(record.strengths, vec!["Good pacing.".to_string()]);
        assert_eq!(record.improvements, improvements());
    }

    #[test]
    fn test_render_includes_scores_and_notes() {
        let record = FeedbackRecord {
            scores: BTreeMap::from([
                ("clarity".to_string(), json!(4)),
                ("relevance".to_string(), json!(3.5)),
            ]),
            strengths: vec!["clear".into()],
            improvements: vec!["more depth".into(), "examples".into()],
            raw: None,
        };
        let text = record.render();
        assert!(text.contains("clarity: 4 | technical_depth: - | relevance: 3.5 | confidence: -"));
        assert!(text.contains("strengths: clear"));
        assert!(text.contains("improvements: more depth; examples"));
        assert!(!text.contains("notes"));

        let raw = record_for("The answer was fine.").render();
        assert!(raw.contains("notes: The answer was fine."));
    }

    #[test]
    fn test_average_scores_per_axis() {
        let a = record_for(r#"{"scores":{"clarity":4,"relevance":2}}"#);
        let b = record_for(r#"{"scores":{"clarity":2}}"#);
        let c = record_for("prose");
        let d = record_for(r#"{"scores":{"clarity":"n/a"}}"#);
        let averages = average_scores([&a, &b, &c, &d]);
        assert_eq!(averages.get("clarity"), Some(&3.0));
        assert_eq!(averages.get("relevance"), Some(&2.0));
        assert_eq!(averages.len(), 2);
    }
}
