// 📂 Scenario Store - Named sample customer records, loaded once
//
// The scenario file is a JSON array of `{ scenarioName, customer }` objects.
// Records are immutable after loading; the customer is kept as raw JSON so
// every field survives for the raw view, including ones we never display.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

// ============================================================================
// SCENARIO RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    pub scenario_name: String,

    /// Customer record, arbitrarily nested, every field optional
    #[serde(default)]
    pub customer: Value,

    /// Any other top-level fields, kept so the raw view is complete
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScenarioRecord {
    pub fn new(scenario_name: impl Into<String>, customer: Value) -> Self {
        ScenarioRecord {
            scenario_name: scenario_name.into(),
            customer,
            extra: Map::new(),
        }
    }

    /// Contents of the raw JSON pane
    pub fn to_pretty_json(&self) -> String {
        // Serializing a Value-backed struct cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// One entry of the scenario selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOption {
    pub value: usize,
    pub label: String,
}

// ============================================================================
// SCENARIO STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ScenarioStore {
    scenarios: Vec<ScenarioRecord>,
}

impl ScenarioStore {
    pub fn new(scenarios: Vec<ScenarioRecord>) -> Self {
        ScenarioStore { scenarios }
    }

    /// Load from a JSON file. No retry: the caller decides what an empty
    /// selector means.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), count = store.len(), "loaded scenarios");
        Ok(store)
    }

    #[cfg(feature = "server")]
    pub async fn load_async(path: &Path) -> Result<Self, LoadError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let store = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), count = store.len(), "loaded scenarios");
        Ok(store)
    }

    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let scenarios: Vec<ScenarioRecord> =
            serde_json::from_str(text).map_err(|source| LoadError::Parse { source })?;
        Ok(ScenarioStore { scenarios })
    }

    pub fn get(&self, index: usize) -> Option<&ScenarioRecord> {
        self.scenarios.get(index)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.scenarios.iter()
    }

    /// Selector options: value = index, label = scenario name
    pub fn options(&self) -> Vec<ScenarioOption> {
        self.scenarios
            .iter()
            .enumerate()
            .map(|(value, s)| ScenarioOption {
                value,
                label: s.scenario_name.clone(),
            })
            .collect()
    }
}
