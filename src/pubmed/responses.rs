use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESearchResult {
    pub esearchresult: ESearchData,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ESearchData {
    /// Total matches, which may exceed the ids returned
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub idlist: Vec<String>,
    /// Set by NCBI for malformed queries instead of an HTTP error
    #[serde(rename = "ERROR", default)]
    pub error: Option<String>,
}

impl ESearchData {
    pub fn total_count(&self) -> Option<usize> {
        self.count.as_deref().and_then(|c| c.parse().ok())
    }
}
