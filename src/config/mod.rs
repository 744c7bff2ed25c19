//! JSON run configuration consumed by the `order_matcher` binary.

pub mod run;

pub use run::{load_config, OutputConfig, RunConfig};
