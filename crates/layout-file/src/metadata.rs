use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project metadata stored alongside the layout recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl LayoutMetadata {
    /// Metadata with the given name, stamped now.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            created: now,
            modified: now,
        }
    }

    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}
