use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator used to pass predefined options to the prompt as one argument.
///
/// There is no escaping: an option that itself contains `|||` is split by the
/// prompt into several options.
pub const OPTION_DELIMITER: &str = "|||";

/// Choices offered to the human alongside the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PredefinedOptions {
    #[default]
    None,
    List(Vec<String>),
}

impl PredefinedOptions {
    /// Coerce a loosely typed protocol argument. Only list-shaped values are
    /// kept; anything else (including null) means "no options".
    ///
    /// String elements are taken verbatim, other elements as their JSON text.
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            Some(Value::Array(items)) => Self::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => Self::None,
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::None => &[],
            Self::List(items) => items,
        }
    }

    /// Join the options into the single command-line argument the prompt
    /// expects. Absent and empty lists both encode to `""`.
    pub fn encode(&self) -> String {
        self.as_slice().join(OPTION_DELIMITER)
    }

    /// Inverse of [`encode`](Self::encode) as the prompt applies it: empty
    /// segments are dropped, and an empty result means no options.
    pub fn decode(encoded: &str) -> Self {
        let items: Vec<String> = encoded
            .split(OPTION_DELIMITER)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if items.is_empty() {
            Self::None
        } else {
            Self::List(items)
        }
    }
}

/// A single question posed to the human.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    pub message: String,
    pub options: PredefinedOptions,
}

impl FeedbackRequest {
    pub fn new(message: impl Into<String>, options: impl Into<PredefinedOptions>) -> Self {
        Self {
            message: message.into(),
            options: options.into(),
        }
    }
}

/// Whatever JSON object the prompt wrote. Keys and values are not inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackResult(Map<String, Value>);

impl FeedbackResult {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for FeedbackResult {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
