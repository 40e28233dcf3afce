//! Prompt Templates
//!
//! Prompts are plain text with `{name}` placeholders. Literal braces are
//! written as `{{` and `}}`. A template is parsed and checked against the set
//! of placeholders its caller supplies exactly once, when the profile store is
//! loaded, so rendering at runtime cannot fail.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// The four prompts the orchestrator sends to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Interviewer,
    Followup,
    Feedback,
    Summary,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Interviewer,
        TemplateKind::Followup,
        TemplateKind::Feedback,
        TemplateKind::Summary,
    ];

    /// Stable name, also used as the template's file stem on disk.
    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Interviewer => "interviewer",
            TemplateKind::Followup => "followup",
            TemplateKind::Feedback => "feedback",
            TemplateKind::Summary => "summary",
        }
    }

    /// Placeholders the orchestrator supplies when rendering this template.
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            TemplateKind::Interviewer => &[
                "role",
                "seniority",
                "domain",
                "persona",
                "persona_style",
                "technical_axes",
                "question_seeds",
            ],
            TemplateKind::Followup | TemplateKind::Feedback => &[
                "answer",
                "role",
                "seniority",
                "domain",
                "persona",
                "persona_style",
            ],
            TemplateKind::Summary => &[
                "role",
                "seniority",
                "domain",
                "persona",
                "persona_style",
                "answer_count",
                "answers",
                "feedback",
                "average_scores",
            ],
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed, validated prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses `source` and rejects any placeholder not listed in `allowed`.
    pub fn parse(name: &str, source: &str, allowed: &[&str]) -> Result<Self, ConfigError> {
        let malformed = |reason: String| ConfigError::MalformedTemplate {
            template: name.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => key.push(ch),
                            None => {
                                return Err(malformed(format!("unterminated placeholder '{{{key}'")));
                            }
                        }
                    }
                    if !is_identifier(&key) {
                        return Err(malformed(format!("invalid placeholder '{{{key}}}'")));
                    }
                    if !allowed.contains(&key.as_str()) {
                        return Err(ConfigError::UnknownPlaceholder {
                            template: name.to_string(),
                            placeholder: key,
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(key));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(malformed("unmatched '}'".to_string())),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The placeholders referenced by this template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(key) => Some(key.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes `values` into the template.
    pub fn render(&self, values: &HashMap<&'static str, String>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(key) => match values.get(key.as_str()) {
                    Some(value) => out.push_str(value),
                    None => {
                        // Unreachable for templates validated against the caller's key set.
                        warn!(template = %self.name, placeholder = %key, "No value supplied for placeholder");
                    }
                },
            }
        }
        out
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let template =
            PromptTemplate::parse("t", "Interview a {seniority} {role}.", &["role", "seniority"])
                .unwrap();
        let rendered = template.render(&values(&[("role", "sales_ae"), ("seniority", "junior")]));
        assert_eq!(rendered, "Interview a junior sales_ae.");
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = PromptTemplate::parse(
            "feedback",
            "Reply as JSON: {{\"scores\": {{}}}} for {answer}",
            &["answer"],
        )
        .unwrap();
        let rendered = template.render(&values(&[("answer", "hi")]));
        assert_eq!(rendered, "Reply as JSON: {\"scores\": {}} for hi");
    }

    #[test]
    fn test_unknown_placeholder_is_rejected() {
        let err = PromptTemplate::parse("summary", "Pay: {salary}", &["role"]).unwrap_err();
        match err {
            ConfigError::UnknownPlaceholder {
                template,
                placeholder,
            } => {
                assert_eq!(template, "summary");
                assert_eq!(placeholder, "salary");
            }
            other => panic!("Expected UnknownPlaceholder, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_placeholder_is_rejected() {
        let err = PromptTemplate::parse("t", "Hello {role", &["role"]).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedTemplate { .. }));
    }

    #[test]
    fn test_stray_closing_brace_is_rejected() {
        let err = PromptTemplate::parse("t", "Hello }", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedTemplate { .. }));
    }

    #[test]
    fn test_unescaped_json_is_rejected() {
        let err = PromptTemplate::parse("t", "{\"scores\": {}}", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedTemplate { .. }));
    }

    #[test]
    fn test_placeholders_in_order() {
        let template = PromptTemplate::parse(
            "t",
            "{answer} / {persona_style} / {answer}",
            &["answer", "persona_style"],
        )
        .unwrap();
        let keys: Vec<&str> = template.placeholders().collect();
        assert_eq!(keys, vec!["answer", "persona_style", "answer"]);
    }

    #[test]
    fn test_every_kind_has_a_unique_name() {
        let mut names: Vec<&str> = TemplateKind::ALL.iter().map(|k| k.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}
