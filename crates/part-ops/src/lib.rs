pub mod boolean;
pub mod footprint;
pub mod shapes;
pub mod types;

pub use boolean::{combine, union_all, BooleanKind};
pub use footprint::{bounding_prism, FootprintSpec};
pub use shapes::{custom_box, mount_hole};
pub use types::*;
