pub mod csg;
pub mod mock_kernel;
pub mod traits;
pub mod types;

#[cfg(feature = "truck")]
pub mod primitives;
#[cfg(feature = "truck")]
pub mod tessellation;
#[cfg(feature = "truck")]
pub mod truck_kernel;

pub use csg::CsgNode;
pub use mock_kernel::MockKernel;
pub use traits::GeometryKernel;
pub use types::*;

#[cfg(feature = "truck")]
pub use truck_kernel::TruckKernel;
