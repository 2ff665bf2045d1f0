//! Quality Assessor data model (§3, §4.9).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub completeness: f64,
    pub sources: Vec<String>,
    pub warnings: Vec<String>,
}

impl DataQuality {
    pub fn new() -> Self {
        DataQuality {
            completeness: 0.0,
            sources: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl Default for DataQuality {
    fn default() -> Self {
        Self::new()
    }
}
