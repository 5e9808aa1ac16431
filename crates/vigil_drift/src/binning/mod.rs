pub mod quantile;

pub use quantile::QuantileBinning;
