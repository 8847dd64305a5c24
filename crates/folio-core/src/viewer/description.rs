use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Link path (or report name) to free-text description, as served from
/// the companion JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptionMap(HashMap<String, String>);

impl DescriptionMap {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Description for a report, looked up by app name first and then by
    /// the report's API path.
    pub fn describe(&self, app_name: &str) -> Option<&str> {
        self.0
            .get(app_name)
            .or_else(|| self.0.get(&format!("/api/reports/{}", app_name)))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
