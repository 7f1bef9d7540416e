use layout_engine::LayoutError;

/// Errors during layout file loading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse file: {0}")]
    ParseError(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    #[error("file version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("migration failed from version {from} to {to}: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },

    #[error("replaying step {index} failed: {source}")]
    ReplayFailed { index: usize, source: LayoutError },
}

/// Errors while writing a layout or exporting geometry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("serialization failed: {0}")]
    SerializeFailed(String),

    #[error("no aggregated solid available for export: {0}")]
    NoSolid(String),

    #[error("tessellation failed: {0}")]
    TessellationFailed(String),

    #[error("STL export failed: {reason}")]
    StlFailed { reason: String },
}
