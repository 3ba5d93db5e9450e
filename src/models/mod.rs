pub mod enums;
mod assessment;
mod child;
mod pregnancy;

pub use assessment::*;
pub use child::*;
pub use pregnancy::*;
