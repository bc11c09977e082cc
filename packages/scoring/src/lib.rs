#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weighted priority scoring and ranking of intersections.
//!
//! Each intersection's combined score is the sum of its two streets'
//! weighted axis sums. The per-axis totals kept alongside the score are
//! raw (unweighted) sums, so coverage-by-axis reporting stays decoupled
//! from whatever weights ranked the set.

use std::cmp::Ordering;

use camera_map_placement_models::{
    AxisWeights, CameraKind, Intersection, RankedSet, ScoredIntersection,
};
use camera_map_registry::StreetDirectory;

/// Scores a single intersection with pre-normalized weights.
///
/// Returns `None` (with a warning) when either street is missing from
/// the directory; a registry-built set never hits this, but scoring is
/// callable on detached data.
#[must_use]
pub fn score_intersection(
    intersection: &Intersection,
    directory: &StreetDirectory,
    weights: &AxisWeights,
) -> Option<ScoredIntersection> {
    let Some(street_a) = directory.get(intersection.street_a) else {
        log::warn!(
            "Skipping intersection {}: street {} not in directory",
            intersection.id,
            intersection.street_a
        );
        return None;
    };
    let Some(street_b) = directory.get(intersection.street_b) else {
        log::warn!(
            "Skipping intersection {}: street {} not in directory",
            intersection.id,
            intersection.street_b
        );
        return None;
    };

    let street_a_score = street_a.scores.weighted_sum(weights);
    let street_b_score = street_b.scores.weighted_sum(weights);
    let axis_totals = street_a.scores + street_b.scores;
    let camera = axis_totals
        .dominant_axis()
        .map_or(CameraKind::DEFAULT, CameraKind::for_axis);

    Some(ScoredIntersection {
        intersection: intersection.clone(),
        street_a_score,
        street_b_score,
        score: street_a_score + street_b_score,
        axis_totals,
        camera,
    })
}

/// Scores every intersection, normalizing the weights once up front.
#[must_use]
pub fn score_all(
    intersections: &[Intersection],
    directory: &StreetDirectory,
    weights: &AxisWeights,
) -> Vec<ScoredIntersection> {
    let normalized = weights.normalized();
    intersections
        .iter()
        .filter_map(|intersection| score_intersection(intersection, directory, &normalized))
        .collect()
}

/// Orders scored intersections by descending score and precomputes the
/// cumulative score share at each position.
///
/// Equal scores keep ascending intersection-id order, so identical
/// inputs always produce an identical ordering. When the total score is
/// not positive every cumulative share is defined as 1.0 and downstream
/// allocation treats the coverage target as trivially satisfied.
#[must_use]
pub fn rank(mut scored: Vec<ScoredIntersection>) -> RankedSet {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.intersection.id.cmp(&b.intersection.id))
    });

    // Total and cumulative sums fold the scores in the same order, so
    // the final share divides a value by itself and lands exactly on 1.
    let total_score: f64 = scored.iter().map(|s| s.score).sum();

    let mut cumulative_share = Vec::with_capacity(scored.len());
    if total_score > 0.0 {
        let mut running = 0.0;
        for entry in &scored {
            running += entry.score;
            cumulative_share.push(running / total_score);
        }
    } else {
        cumulative_share.resize(scored.len(), 1.0);
    }

    RankedSet {
        entries: scored,
        cumulative_share,
        total_score,
    }
}
