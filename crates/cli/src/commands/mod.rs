pub mod analyze;
pub mod dump;
pub mod util;

pub use analyze::*;
pub use dump::*;
pub use util::*;
