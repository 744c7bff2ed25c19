//! Configuration search over the four flip/mirror permutations.
//!
//! The spectral estimate fixes the inter-order direction only up to sign
//! conventions of the acquisition. Each permutation is tried as a full
//! estimate → match pass; passes are scored by chain count and gated by
//! soft quality checks:
//! - too few chains in absolute terms,
//! - too few chains relative to the input size,
//! - no peak in the coarse link-angle histogram.
//!
//! A failing check moves on to the next permutation until the retry budget is
//! spent; deep search evaluates all four. The winner is the attempt with the
//! most chains (ties go to the lowest canonical index), and its window is
//! tightened to the observed link geometry.

mod controller;
mod quality;
mod state;

pub use controller::{tightened_window, SearchController, SearchOutcome, SearchSettings};
pub use quality::{assess, QualityReport, QualityThresholds, SearchWarning};
pub use state::{Attempt, PermutationStatus, SearchState};
