pub mod errors;
pub mod export;
pub mod load;
pub mod metadata;
pub mod migrate;
pub mod save;

pub use errors::{ExportError, LoadError};
pub use export::{export_ascii_stl, export_baseplate_stl, export_binary_stl, StlFormat};
pub use load::{load_layout, open_layout, LoadedLayout};
pub use metadata::LayoutMetadata;
pub use save::{save_layout, FORMAT_ID, FORMAT_VERSION};
