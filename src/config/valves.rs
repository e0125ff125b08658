use serde::{Deserialize, Serialize};
use std::fmt;

/// User-editable settings of the pipe.
///
/// Field names on the wire are the ones the chat host shows to users. Every
/// field defaults to an empty string and nothing is validated.
#[allow(non_snake_case)]
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Valves {
    /// Base URL for the API, e.g. `https://api.lorica.ai`.
    pub LORICA_API_BASE_URL: String,
    /// API key sent as a bearer token.
    pub LORICA_API_KEY: String,
    /// Model identifier, e.g. `org/model-name`.
    pub MODEL_ID: String,
}

impl Valves {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            LORICA_API_BASE_URL: base_url.into(),
            LORICA_API_KEY: api_key.into(),
            MODEL_ID: model_id.into(),
        }
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "********"
    }
}

impl fmt::Debug for Valves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Valves")
            .field("LORICA_API_BASE_URL", &self.LORICA_API_BASE_URL)
            .field("LORICA_API_KEY", &mask(&self.LORICA_API_KEY))
            .field("MODEL_ID", &self.MODEL_ID)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_empty() {
        let valves = Valves::default();
        assert_eq!(
            serde_json::to_value(&valves).unwrap(),
            json!({"LORICA_API_BASE_URL": "", "LORICA_API_KEY": "", "MODEL_ID": ""})
        );
    }

    #[test]
    fn test_partial_update_keeps_defaults() {
        let valves: Valves = serde_json::from_value(json!({"MODEL_ID": "org/model"})).unwrap();
        assert_eq!(valves.MODEL_ID, "org/model");
        assert_eq!(valves.LORICA_API_KEY, "");
    }

    #[test]
    fn test_debug_hides_key() {
        let valves = Valves::new("https://api.lorica.ai", "sk-secret", "m");
        let shown = format!("{valves:?}");
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("********"));
        assert!(shown.contains("api.lorica.ai"));
    }
}
