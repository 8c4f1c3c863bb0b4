//! Seams between the pipeline crates.

pub mod cancellation;
pub mod evaluation_store;

pub use cancellation::{Cancellable, CancellationToken};
pub use evaluation_store::EvaluationStore;
