pub mod error;
pub mod mapping;
pub mod metric;
pub mod table;

pub use error::TypeError;
pub use mapping::*;
pub use metric::*;
pub use table::*;
