pub mod baseline;
pub mod defs;

pub use baseline::BaselineHost;
pub use defs::*;
