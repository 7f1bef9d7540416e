use layout_engine::{Layout, LayoutConfig, RecordedStep};
use serde_json::Value;
use tracing::info;

use crate::errors::LoadError;
use crate::metadata::LayoutMetadata;
use crate::save::{LayoutFile, FORMAT_ID, FORMAT_VERSION};

/// Contents of a layout file, ready to replay.
#[derive(Debug, Clone)]
pub struct LoadedLayout {
    pub metadata: LayoutMetadata,
    pub config: LayoutConfig,
    pub steps: Vec<RecordedStep>,
}

/// Deserialize a layout file from a JSON string.
///
/// Validates the format identifier and version, migrating older files.
pub fn load_layout(json: &str) -> Result<LoadedLayout, LoadError> {
    let raw: Value = serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    let format = raw.get("format").and_then(Value::as_str).unwrap_or_default();
    if format != FORMAT_ID {
        return Err(LoadError::UnknownFormat(format.to_string()));
    }

    let version = raw
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| LoadError::ParseError("missing or invalid version".into()))?;
    if version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: version,
            supported_version: FORMAT_VERSION,
        });
    }

    let raw = if version < FORMAT_VERSION {
        crate::migrate::migrate(raw, version, FORMAT_VERSION)?
    } else {
        raw
    };

    let file: LayoutFile =
        serde_json::from_value(raw).map_err(|e| LoadError::ParseError(e.to_string()))?;
    Ok(LoadedLayout {
        metadata: file.project,
        config: file.config,
        steps: file.steps,
    })
}

/// Load a layout file and replay its steps into a fresh layout.
///
/// The returned layout has not been redrawn.
pub fn open_layout(json: &str) -> Result<(Layout, LayoutMetadata), LoadError> {
    let loaded = load_layout(json)?;
    let mut layout = Layout::new(loaded.config);
    for (index, step) in loaded.steps.iter().enumerate() {
        layout
            .apply_recorded(step)
            .map_err(|source| LoadError::ReplayFailed { index, source })?;
    }
    info!(name = %loaded.metadata.name, steps = loaded.steps.len(), "layout opened");
    Ok((layout, loaded.metadata))
}
