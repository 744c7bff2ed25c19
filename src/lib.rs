#![doc = include_str!("../README.md")]

// Core pipeline
pub mod filter;
pub mod matching;
pub mod orientation;
pub mod scheduler;
pub mod search;
pub mod types;

// Input, output and run plumbing
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fields;
pub mod output;

// Numeric building blocks
pub mod angle;
pub mod image;
pub mod spectrum;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{ConfigError, InputError, PipelineError, SchedulerError};
pub use crate::fields::{EditDistanceResolver, FieldResolver, FieldRole, LocalizationTable};
pub use crate::filter::{filter_isolated, IsolationParams};
pub use crate::matching::{match_frame, MatchParams};
pub use crate::orientation::{EstimatorParams, OrientationEstimator};
pub use crate::scheduler::FrameScheduler;
pub use crate::search::{SearchController, SearchOutcome, SearchSettings, SearchWarning};
pub use crate::types::{
    AngleWindow, DistanceWindow, Localization, LocalizationSet, MatchWindow, OrderChain,
    OrientationEstimate, Permutation,
};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use order_matcher::prelude::*;
///
/// # fn main() -> Result<(), PipelineError> {
/// let set = LocalizationSet::from(vec![
///     Localization::new(0, 1, 1000.0, 1000.0, 500.0),
///     Localization::new(1, 1, 2719.6, 1531.9, 900.0),
/// ]);
/// let outcome = SearchController::new(SearchSettings {
///     deep_search: true,
///     ..Default::default()
/// })
/// .run(&set)?;
/// println!("chains={} window={:?}", outcome.chains.len(), outcome.window);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::error::PipelineError;
    pub use crate::types::{Localization, LocalizationSet, OrderChain, Permutation};
    pub use crate::{SearchController, SearchOutcome, SearchSettings};
}
