use layout_engine::{Layout, LayoutConfig, RecordedStep};
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::metadata::LayoutMetadata;

/// Format identifier written to every file.
pub const FORMAT_ID: &str = "optics-layout";

/// Current file format version.
pub const FORMAT_VERSION: u32 = 2;

/// The top-level file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    pub format: String,
    pub version: u32,
    pub project: LayoutMetadata,
    pub config: LayoutConfig,
    /// The recorded placement calls.
    pub steps: Vec<RecordedStep>,
}

/// Serialize a layout's recipe to pretty-printed JSON.
pub fn save_layout(layout: &Layout, metadata: &LayoutMetadata) -> Result<String, ExportError> {
    let file = LayoutFile {
        format: FORMAT_ID.to_string(),
        version: FORMAT_VERSION,
        project: metadata.clone(),
        config: *layout.config(),
        steps: layout.steps().to_vec(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| ExportError::SerializeFailed(e.to_string()))
}
