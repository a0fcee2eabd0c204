pub mod assessment;
pub mod enums;
pub mod health;

pub use assessment::*;
pub use enums::*;
pub use health::*;
