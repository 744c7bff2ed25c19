//! Serializable run diagnostics.
//!
//! `RunReport` is what the binary writes: input shape, the selected
//! permutation and tightened window, one `AttemptSummary` per permutation
//! tried, soft warnings, stage timings and the projected chain rows.

pub mod attempts;
pub mod report;
pub mod timing;

pub use attempts::AttemptSummary;
pub use report::{InputDescriptor, RunReport};
pub use timing::{StageTiming, TimingBreakdown};
