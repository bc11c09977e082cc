#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Constrained greedy camera site allocation.
//!
//! Walks a ranked intersection set in priority order and selects sites
//! under three interacting constraints: minimum spatial separation
//! between sites sharing a street, a per-street ceiling on claimed
//! priority mass, and an optional site count ceiling. Coverage expands
//! beyond the selected sites themselves: a placed camera also covers
//! neighboring intersections on its streets within the coverage radius.
//!
//! The allocation is a deterministic approximation; the underlying
//! weighted maximum-coverage problem is NP-hard, so no claim of global
//! optimality is made. Infeasibility is reported as data in the result,
//! never as an error.

mod allocator;

pub use allocator::allocate;

use camera_map_placement_models::InvalidParameterError;
use thiserror::Error;

/// Errors raised before an allocation run starts.
///
/// The allocator itself raises no errors in steady state; once
/// parameters pass validation, every input produces a result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A plan parameter was outside its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] InvalidParameterError),
}
