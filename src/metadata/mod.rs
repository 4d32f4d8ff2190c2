pub mod record;
pub use record::*;

pub mod windowing;
pub use windowing::*;
