pub mod error;
pub mod reader;
pub mod transform;

pub use error::DataFrameError;
pub use reader::{read_reference, ReferenceFormat};
pub use transform::apply_duration;
