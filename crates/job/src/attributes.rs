use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input flags read by a job while it runs.
///
/// The recognized keys are fixed; anything else found in a JSON payload is
/// kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAttributes {
    /// Makes the job fail with a domain error instead of doing its work.
    #[serde(default)]
    pub force_error: bool,
    /// Makes the work body panic. Used to exercise fault containment.
    #[serde(default)]
    pub force_fault: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses attributes from a JSON object. Missing flags default to `false`.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn with_force_error(mut self, value: bool) -> Self {
        self.force_error = value;
        self
    }

    pub fn with_force_fault(mut self, value: bool) -> Self {
        self.force_fault = value;
        self
    }

    /// Looks up a key that is not one of the recognized flags.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
