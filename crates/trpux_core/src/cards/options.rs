//! Per-source configuration options offered by parsers.

use serde::{Deserialize, Serialize};

/// Configuration surface of a source. Every list is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singles: Option<Vec<SingleField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timespans: Option<Vec<TimeSpanField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multichoices: Option<Vec<MultiChoiceField>>,
}

impl Options {
    pub fn is_empty(&self) -> bool {
        self.singles.as_ref().is_none_or(Vec::is_empty)
            && self.timespans.as_ref().is_none_or(Vec::is_empty)
            && self.multichoices.as_ref().is_none_or(Vec::is_empty)
    }
}

/// A free single-value field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleField {
    pub name: String,
    pub label: String,
    pub description: String,
}

impl SingleField {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Largest unit a time span field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "d")]
    Days,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpanField {
    pub name: String,
    pub label: String,
    pub description: String,
    #[serde(rename = "maxUnit")]
    pub max_unit: TimeUnit,
}

/// A field choosing any number of values from a fixed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiChoiceField {
    pub name: String,
    pub label: String,
    pub description: String,
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_options_wire_format() {
        let options = Options {
            singles: None,
            timespans: Some(vec![TimeSpanField {
                name: "testSpan".into(),
                label: "Test Span".into(),
                description: "Span".into(),
                max_unit: TimeUnit::Days,
            }]),
            multichoices: Some(vec![]),
        };

        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({
                "timespans": [
                    {
                        "name": "testSpan",
                        "label": "Test Span",
                        "description": "Span",
                        "maxUnit": "d"
                    }
                ],
                "multichoices": []
            })
        );
        assert!(!options.is_empty());
        assert!(Options::default().is_empty());
    }

    #[test]
    fn test_rejects_unknown_time_unit() {
        let parsed = serde_json::from_value::<TimeSpanField>(json!({
            "name": "n", "label": "l", "description": "d", "maxUnit": "w"
        }));
        assert!(parsed.is_err());
    }
}
