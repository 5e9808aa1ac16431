pub mod health;
pub mod iterate;
pub mod metrics;

pub use health::*;
pub use iterate::*;
pub use metrics::*;
