//! Static position features used as covariates and complexity proxies.

pub mod encoder;

pub use encoder::{MaterialValues, PositionEncoder};
