#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Street, intersection, and placement plan types shared across the
//! camera map toolchain.
//!
//! This crate defines the canonical data model: per-street priority axes,
//! deduplicated intersection entities, scored/ranked sets, the placement
//! parameters, and the allocation result surfaced to export layers.

pub mod pricing;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the four priority axes measured per street.
///
/// The declaration order is the fixed precedence order used everywhere a
/// tie between axes must be broken deterministically.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Axis {
    /// Public safety demand.
    Safety,
    /// Transit corridor activity.
    Transit,
    /// Commercial density.
    Commercial,
    /// Traffic mobility.
    Mobility,
}

impl Axis {
    /// All axes in precedence order.
    pub const ALL: &[Self] = &[Self::Safety, Self::Transit, Self::Commercial, Self::Mobility];
}

/// The four non-negative axis measures attached to a street (or summed
/// across the two streets of an intersection).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScores {
    /// Safety axis measure.
    pub safety: f64,
    /// Transit axis measure.
    pub transit: f64,
    /// Commercial axis measure.
    pub commercial: f64,
    /// Mobility axis measure.
    pub mobility: f64,
}

impl AxisScores {
    /// All four measures set to zero.
    pub const ZERO: Self = Self {
        safety: 0.0,
        transit: 0.0,
        commercial: 0.0,
        mobility: 0.0,
    };

    /// Returns the measure for a single axis.
    #[must_use]
    pub const fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Safety => self.safety,
            Axis::Transit => self.transit,
            Axis::Commercial => self.commercial,
            Axis::Mobility => self.mobility,
        }
    }

    /// Weighted sum of the four measures.
    #[must_use]
    pub fn weighted_sum(&self, weights: &AxisWeights) -> f64 {
        weights.safety * self.safety
            + weights.transit * self.transit
            + weights.commercial * self.commercial
            + weights.mobility * self.mobility
    }

    /// The axis with the strictly largest positive measure.
    ///
    /// Returns `None` when the maximum is not positive. Ties keep the
    /// first axis in [`Axis::ALL`] precedence order.
    #[must_use]
    pub fn dominant_axis(&self) -> Option<Axis> {
        let mut best: Option<(Axis, f64)> = None;
        for &axis in Axis::ALL {
            let value = self.get(axis);
            match best {
                Some((_, top)) if value <= top => {}
                _ if value <= 0.0 => {}
                _ => best = Some((axis, value)),
            }
        }
        best.map(|(axis, _)| axis)
    }
}

impl std::ops::Add for AxisScores {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            safety: self.safety + rhs.safety,
            transit: self.transit + rhs.transit,
            commercial: self.commercial + rhs.commercial,
            mobility: self.mobility + rhs.mobility,
        }
    }
}

impl std::ops::AddAssign for AxisScores {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Relative importance of each axis when ranking intersections.
///
/// Weights are non-negative and need not sum to 1; [`Self::normalized`]
/// produces the fractions actually applied during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisWeights {
    /// Weight for the safety axis.
    pub safety: f64,
    /// Weight for the transit axis.
    pub transit: f64,
    /// Weight for the commercial axis.
    pub commercial: f64,
    /// Weight for the mobility axis.
    pub mobility: f64,
}

impl AxisWeights {
    /// Sum of the four raw weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.safety + self.transit + self.commercial + self.mobility
    }

    /// Divides each weight by the total, substituting a total of 1 when
    /// every weight is zero so the division is always defined.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let total = if self.sum() > 0.0 { self.sum() } else { 1.0 };
        Self {
            safety: self.safety / total,
            transit: self.transit / total,
            commercial: self.commercial / total,
            mobility: self.mobility / total,
        }
    }
}

/// A street with its per-axis priority measures.
///
/// Immutable once loaded; keyed by `id` in the street directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetAttributes {
    /// Stable street identifier from the source dataset.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Per-axis measures.
    pub scores: AxisScores,
}

/// One raw intersection row as it arrives from the source table, before
/// deduplication. A `(0, 0)` coordinate pair means the location is
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionRaw {
    /// First street id as listed in the source row.
    pub street_a: u32,
    /// Second street id as listed in the source row.
    pub street_b: u32,
    /// Display name of the first street.
    pub name_a: String,
    /// Display name of the second street.
    pub name_b: String,
    /// Latitude, or 0 when missing.
    pub lat: f64,
    /// Longitude, or 0 when missing.
    pub lon: f64,
}

impl IntersectionRaw {
    /// Whether the row carries a usable coordinate pair.
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.lat != 0.0 && self.lon != 0.0
    }
}

/// A canonical, deduplicated intersection entity.
///
/// Exactly one exists per unordered street pair; `street_a` always holds
/// the smaller street id, with the display names reordered to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    /// Sequential id assigned in first-seen order, starting at 1.
    pub id: u32,
    /// Smaller street id of the canonical pair.
    pub street_a: u32,
    /// Display name matching `street_a`.
    pub name_a: String,
    /// Larger street id of the canonical pair.
    pub street_b: u32,
    /// Display name matching `street_b`.
    pub name_b: String,
    /// Latitude (running-averaged across duplicate source rows).
    pub lat: f64,
    /// Longitude (running-averaged across duplicate source rows).
    pub lon: f64,
}

impl Intersection {
    /// Whether this intersection lies on the given street.
    #[must_use]
    pub const fn touches(&self, street: u32) -> bool {
        self.street_a == street || self.street_b == street
    }

    /// The distinct street ids of this intersection (one entry when a
    /// street crosses itself).
    #[must_use]
    pub fn streets(&self) -> Vec<u32> {
        if self.street_a == self.street_b {
            vec![self.street_a]
        } else {
            vec![self.street_a, self.street_b]
        }
    }
}

/// Camera hardware classes suggested per intersection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraKind {
    /// Pan-tilt-zoom, suited to safety monitoring.
    Ptz,
    /// 360-degree dome, suited to transit corridors.
    Dome360,
    /// Fixed lens, suited to commercial frontage.
    Fixed,
    /// License plate reader, suited to mobility corridors.
    Lpr,
}

impl CameraKind {
    /// Fallback when no axis has a positive total.
    pub const DEFAULT: Self = Self::Fixed;

    /// All camera kinds, in the same order as [`Axis::ALL`].
    pub const ALL: &[Self] = &[Self::Ptz, Self::Dome360, Self::Fixed, Self::Lpr];

    /// The camera kind that serves a given priority axis.
    #[must_use]
    pub const fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::Safety => Self::Ptz,
            Axis::Transit => Self::Dome360,
            Axis::Commercial => Self::Fixed,
            Axis::Mobility => Self::Lpr,
        }
    }
}

/// An intersection with its computed priority score and reporting totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredIntersection {
    /// The underlying canonical intersection.
    pub intersection: Intersection,
    /// Weighted score contributed by the first street.
    pub street_a_score: f64,
    /// Weighted score contributed by the second street.
    pub street_b_score: f64,
    /// Combined priority score (sum of the two street scores).
    pub score: f64,
    /// Unweighted per-axis sums across both streets, used for
    /// coverage-by-axis reporting (decoupled from the ranking weights).
    pub axis_totals: AxisScores,
    /// Suggested camera hardware, from the dominant axis total.
    pub camera: CameraKind,
}

/// The full scored dataset in rank order with cumulative share stats.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSet {
    /// Intersections ordered by descending score (ties: ascending
    /// intersection id).
    pub entries: Vec<ScoredIntersection>,
    /// Cumulative score share at each position. Every entry is 1.0 when
    /// `total_score` is not positive.
    pub cumulative_share: Vec<f64>,
    /// Sum of all combined scores.
    pub total_score: f64,
}

impl RankedSet {
    /// Number of ranked intersections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration for one placement allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanParams {
    /// Fraction of total priority mass to cover, 0 to 1.
    pub target_coverage: f64,
    /// Minimum distance in meters between selected sites sharing a
    /// street. 0 disables the separation check.
    pub min_separation_m: f64,
    /// Distance in meters within which a selected site also covers
    /// neighboring intersections on its streets.
    pub coverage_radius_m: f64,
    /// Optional ceiling on the number of selected sites.
    pub max_sites: Option<usize>,
    /// Optional ceiling on the fraction of any single street's priority
    /// mass that selections may claim, 0 to 1.
    pub street_cap: Option<f64>,
}

impl PlanParams {
    /// Checks every parameter range before any processing happens.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameterError`] naming the first parameter that
    /// is out of range.
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        if !(0.0..=1.0).contains(&self.target_coverage) {
            return Err(InvalidParameterError {
                name: "targetCoverage",
                value: self.target_coverage,
            });
        }
        if self.min_separation_m < 0.0 || !self.min_separation_m.is_finite() {
            return Err(InvalidParameterError {
                name: "minSeparationM",
                value: self.min_separation_m,
            });
        }
        if self.coverage_radius_m < 0.0 || !self.coverage_radius_m.is_finite() {
            return Err(InvalidParameterError {
                name: "coverageRadiusM",
                value: self.coverage_radius_m,
            });
        }
        if let Some(cap) = self.street_cap {
            if !(0.0..=1.0).contains(&cap) {
                return Err(InvalidParameterError {
                    name: "streetCap",
                    value: cap,
                });
            }
        }
        Ok(())
    }
}

/// Error returned when a [`PlanParams`] field is outside its valid range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidParameterError {
    /// Name of the offending parameter.
    pub name: &'static str,
    /// The rejected value.
    pub value: f64,
}

impl std::fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid parameter {}: {}", self.name, self.value)
    }
}

impl std::error::Error for InvalidParameterError {}

/// What cut an allocation run short of its coverage target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitingFactor {
    /// The explicit site count ceiling was reached.
    CountLimit,
    /// The ranked list ran out of candidates eligible under the
    /// separation and street-cap constraints.
    Constrained,
}

/// Realized coverage share per axis: covered axis totals divided by
/// dataset-wide axis totals (0 when the dataset total for an axis is 0).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisCoverage {
    /// Covered share of the safety axis.
    pub safety: f64,
    /// Covered share of the transit axis.
    pub transit: f64,
    /// Covered share of the commercial axis.
    pub commercial: f64,
    /// Covered share of the mobility axis.
    pub mobility: f64,
}

/// Outcome of one constrained greedy allocation run.
///
/// Infeasibility is reported as data, never as an error: a partial
/// selection is always a valid result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    /// Selected sites in selection order (rank order after skips).
    pub selected: Vec<ScoredIntersection>,
    /// Number of intersections covered (selected or within coverage
    /// radius of a selected site on a shared street).
    pub covered_count: usize,
    /// Covered score divided by total score; 1.0 when the total score is
    /// not positive.
    pub coverage_real: f64,
    /// Whether `coverage_real` reached the target within a 1% tolerance
    /// band.
    pub target_met: bool,
    /// Why the run stopped short, if it did.
    pub limiting: Option<LimitingFactor>,
    /// Coverage share per axis for the covered set.
    pub axis_coverage: AxisCoverage,
}

/// An existing equipment point shown as a map overlay.
///
/// These records pass through the toolchain untouched; the only
/// computation applied is the minimum-weight display filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentPoint {
    /// Equipment type label from the source table.
    pub kind: String,
    /// Street label from the source table.
    pub street: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Importance weight, nominally 1-5.
    pub weight: f64,
}

impl EquipmentPoint {
    /// Whether this point passes the overlay display threshold.
    #[must_use]
    pub fn meets_threshold(&self, min_weight: f64) -> bool {
        self.weight >= min_weight
    }
}
