pub mod beam;
pub mod direction;
pub mod optics;
pub mod placement;
pub mod units;

pub use beam::*;
pub use direction::*;
pub use optics::*;
pub use placement::*;
pub use units::*;
