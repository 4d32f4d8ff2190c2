pub mod batch;
pub mod convert;
pub mod errors;
pub mod file;
pub mod metadata;
pub mod preprocess;
pub mod save;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::*;
pub use convert::*;
pub use metadata::*;
pub use preprocess::*;
pub use transform::*;
