use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Characters that would change the meaning of a feed path if embedded.
const PATH_RESERVED: [char; 4] = ['/', '?', '#', '%'];

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque identifier of a workflow on the remote engine.
///
/// The engine hands out integer ids, but the dashboard never does
/// arithmetic on them: both JSON numbers and strings are accepted and the
/// value is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WorkflowId(String);

impl WorkflowId {
    /// Wrap a raw identifier. Surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can be embedded in `/status/{id}` as a single path
    /// segment without escaping.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && !self
                .0
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || PATH_RESERVED.contains(&c))
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkflowId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl<'de> Deserialize<'de> for WorkflowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Ok(Self(n.to_string())),
            Raw::Text(s) if s.trim().is_empty() => {
                Err(serde::de::Error::custom("workflow id must not be empty"))
            }
            Raw::Text(s) => {
                let id = Self::new(s);
                if !id.is_path_safe() {
                    return Err(serde::de::Error::custom(format!(
                        "workflow id '{id}' is not a single path segment"
                    )));
                }
                Ok(id)
            }
        }
    }
}
