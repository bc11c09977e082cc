//! The greedy allocation pass over a ranked set.

use std::collections::BTreeMap;

use camera_map_placement_models::{
    AllocationResult, AxisCoverage, AxisScores, LimitingFactor, PlanParams, RankedSet,
    ScoredIntersection,
};
use camera_map_spatial::PointIndex;

use crate::PlanError;

/// Tolerance band on the coverage target: floating-point and
/// discretization slack within 1% of the target still counts as met.
const TARGET_TOLERANCE: f64 = 0.99;

/// Runs the constrained greedy allocation over `ranked`.
///
/// Processing the list in rank order, each candidate is skipped when an
/// already-selected site on a shared street lies closer than the
/// minimum separation, or when claiming its newly covered neighbors
/// would push a touched street past the per-street cap. A selected site
/// covers every not-yet-covered intersection that shares one of its
/// streets and lies within the coverage radius. A newly covered
/// intersection's full score counts toward every street it touches, so
/// a shared score is judged against each street's budget independently.
///
/// The run stops at the site ceiling when one is set; otherwise it
/// stops as soon as the accumulated covered score reaches the target.
///
/// # Errors
///
/// Returns [`PlanError::InvalidParameter`] when a parameter is out of
/// range. Infeasible targets are not errors: the partial selection
/// comes back with `target_met = false` and a limiting factor.
pub fn allocate(ranked: &RankedSet, params: &PlanParams) -> Result<AllocationResult, PlanError> {
    params.validate()?;

    // No intersections or no priority mass: a defined terminal state,
    // not an error. Every coverage fraction is 1.0 by definition.
    if ranked.is_empty() || ranked.total_score <= 0.0 {
        log::info!("Allocation short-circuit: no priority mass to cover");
        return Ok(AllocationResult {
            selected: Vec::new(),
            covered_count: 0,
            coverage_real: 1.0,
            target_met: true,
            limiting: None,
            axis_coverage: AxisCoverage::default(),
        });
    }

    let entries = &ranked.entries;
    let total_score = ranked.total_score;

    // Dataset-wide accounting: per-street score mass, per-axis totals,
    // and one spatial index over every intersection for the coverage
    // radius queries.
    let mut street_totals: BTreeMap<u32, f64> = BTreeMap::new();
    let mut dataset_axis = AxisScores::ZERO;
    let mut all_points = PointIndex::new();
    for (idx, entry) in entries.iter().enumerate() {
        for street in entry.intersection.streets() {
            *street_totals.entry(street).or_insert(0.0) += entry.score;
        }
        dataset_axis += entry.axis_totals;
        all_points.insert(idx, entry.intersection.lat, entry.intersection.lon);
    }

    let mut covered = vec![false; entries.len()];
    let mut covered_score = 0.0;
    let mut covered_axis = AxisScores::ZERO;
    let mut street_covered: BTreeMap<u32, f64> = BTreeMap::new();
    let mut sites_by_street: BTreeMap<u32, PointIndex> = BTreeMap::new();
    let mut selected: Vec<ScoredIntersection> = Vec::new();
    let mut count_limited = false;

    for entry in entries {
        if let Some(max_sites) = params.max_sites {
            if selected.len() >= max_sites {
                count_limited = true;
                break;
            }
        }

        // The target only stops the walk when no site ceiling is set;
        // with a ceiling the caller asked for that many sites.
        if params.max_sites.is_none() && covered_score / total_score >= params.target_coverage {
            break;
        }

        let candidate = &entry.intersection;

        if params.min_separation_m > 0.0 {
            let too_close = candidate.streets().into_iter().any(|street| {
                sites_by_street.get(&street).is_some_and(|sites| {
                    sites.any_within(candidate.lat, candidate.lon, params.min_separation_m)
                })
            });
            if too_close {
                continue;
            }
        }

        // Everything this site would newly cover: not-yet-covered
        // intersections sharing a street with the candidate inside the
        // coverage radius. The candidate itself is at distance zero, so
        // it is in the set whenever it is not already covered.
        let mut newly: Vec<usize> = all_points
            .within_radius(candidate.lat, candidate.lon, params.coverage_radius_m)
            .into_iter()
            .filter(|&idx| !covered[idx])
            .filter(|&idx| {
                let other = &entries[idx].intersection;
                other.touches(candidate.street_a) || other.touches(candidate.street_b)
            })
            .collect();
        newly.sort_unstable();

        if let Some(cap) = params.street_cap {
            let over_cap = candidate.streets().into_iter().any(|street| {
                let street_total = street_totals.get(&street).copied().unwrap_or(0.0);
                if street_total <= 0.0 {
                    return false;
                }
                let added: f64 = newly
                    .iter()
                    .filter(|&&idx| entries[idx].intersection.touches(street))
                    .map(|&idx| entries[idx].score)
                    .sum();
                let already = street_covered.get(&street).copied().unwrap_or(0.0);
                (already + added) / street_total > cap
            });
            if over_cap {
                continue;
            }
        }

        for street in candidate.streets() {
            sites_by_street.entry(street).or_default().insert(
                selected.len(),
                candidate.lat,
                candidate.lon,
            );
        }
        selected.push(entry.clone());

        for &idx in &newly {
            covered[idx] = true;
            let entry = &entries[idx];
            covered_score += entry.score;
            covered_axis += entry.axis_totals;
            for street in entry.intersection.streets() {
                *street_covered.entry(street).or_insert(0.0) += entry.score;
            }
        }
    }

    let coverage_real = covered_score / total_score;
    let target_met = coverage_real >= params.target_coverage * TARGET_TOLERANCE;
    let limiting = if count_limited {
        Some(LimitingFactor::CountLimit)
    } else if target_met {
        None
    } else {
        Some(LimitingFactor::Constrained)
    };

    log::info!(
        "Selected {} sites covering {:.1}% of priority mass (target {:.1}%)",
        selected.len(),
        coverage_real * 100.0,
        params.target_coverage * 100.0
    );

    Ok(AllocationResult {
        selected,
        covered_count: covered.iter().filter(|&&flag| flag).count(),
        coverage_real,
        target_met,
        limiting,
        axis_coverage: AxisCoverage {
            safety: axis_share(covered_axis.safety, dataset_axis.safety),
            transit: axis_share(covered_axis.transit, dataset_axis.transit),
            commercial: axis_share(covered_axis.commercial, dataset_axis.commercial),
            mobility: axis_share(covered_axis.mobility, dataset_axis.mobility),
        },
    })
}

/// Covered share of one axis; 0 when the dataset has no mass on it.
fn axis_share(covered: f64, dataset_total: f64) -> f64 {
    if dataset_total > 0.0 {
        covered / dataset_total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_map_placement_models::{CameraKind, Intersection};
    use camera_map_spatial::EARTH_RADIUS_M;

    /// Degrees of latitude spanning the given distance in meters.
    fn lat_degrees(meters: f64) -> f64 {
        meters / (EARTH_RADIUS_M * std::f64::consts::PI / 180.0)
    }

    fn entry(id: u32, streets: (u32, u32), score: f64, lat: f64, lon: f64) -> ScoredIntersection {
        let (street_a, street_b) = streets;
        ScoredIntersection {
            intersection: Intersection {
                id,
                street_a,
                name_a: format!("Street {street_a}"),
                street_b,
                name_b: format!("Street {street_b}"),
                lat,
                lon,
            },
            street_a_score: score / 2.0,
            street_b_score: score / 2.0,
            score,
            axis_totals: AxisScores {
                safety: score,
                transit: 0.0,
                commercial: 0.0,
                mobility: 0.0,
            },
            camera: CameraKind::Ptz,
        }
    }

    fn params() -> PlanParams {
        PlanParams {
            target_coverage: 1.0,
            min_separation_m: 0.0,
            coverage_radius_m: 0.0,
            max_sites: None,
            street_cap: None,
        }
    }

    fn selected_ids(result: &AllocationResult) -> Vec<u32> {
        result
            .selected
            .iter()
            .map(|s| s.intersection.id)
            .collect()
    }

    #[test]
    fn invalid_parameters_fail_before_processing() {
        let ranked = camera_map_scoring::rank(vec![entry(1, (1, 2), 5.0, 0.0, 0.0)]);
        let bad = PlanParams {
            target_coverage: -0.1,
            ..params()
        };
        assert!(matches!(
            allocate(&ranked, &bad),
            Err(PlanError::InvalidParameter(_))
        ));
    }

    #[test]
    fn zero_total_score_is_a_trivially_met_terminal_state() {
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 0.0, 0.0, 0.0),
            entry(2, (2, 3), 0.0, 0.0, 0.1),
        ]);

        let result = allocate(&ranked, &params()).unwrap();
        assert!(result.selected.is_empty());
        assert_eq!(result.coverage_real, 1.0);
        assert!(result.target_met);
        assert_eq!(result.limiting, None);
    }

    #[test]
    fn empty_input_yields_empty_met_result() {
        let ranked = camera_map_scoring::rank(Vec::new());

        let result = allocate(&ranked, &params()).unwrap();
        assert!(result.selected.is_empty());
        assert_eq!(result.covered_count, 0);
        assert!(result.target_met);
    }

    #[test]
    fn unconstrained_run_reduces_to_cumulative_truncation() {
        // min separation 0 and no cap: take ranked items in order until
        // the target is reached, exactly like truncating the cumulative
        // share column.
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 40.0, 0.0, 0.0),
            entry(2, (3, 4), 30.0, 1.0, 1.0),
            entry(3, (5, 6), 20.0, 2.0, 2.0),
            entry(4, (7, 8), 10.0, 3.0, 3.0),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                target_coverage: 0.6,
                ..params()
            },
        )
        .unwrap();

        // 40 covers 0.4 < 0.6; adding 30 reaches 0.7 >= 0.6.
        assert_eq!(selected_ids(&result), vec![1, 2]);
        assert!((result.coverage_real - 0.7).abs() < 1e-12);
        assert!(result.target_met);
        assert_eq!(result.limiting, None);
    }

    #[test]
    fn separation_excludes_near_sites_on_a_shared_street() {
        // Three intersections along street 1 at 0 m, 100 m, and 300 m.
        // With 150 m separation the second is blocked by the first and
        // the third is allowed.
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 30.0, 0.0, 0.0),
            entry(2, (1, 3), 20.0, lat_degrees(100.0), 0.0),
            entry(3, (1, 4), 10.0, lat_degrees(300.0), 0.0),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                min_separation_m: 150.0,
                ..params()
            },
        )
        .unwrap();

        assert_eq!(selected_ids(&result), vec![1, 3]);
        // The skipped intersection is not covered either.
        assert_eq!(result.covered_count, 2);
        assert!(!result.target_met);
        assert_eq!(result.limiting, Some(LimitingFactor::Constrained));
    }

    #[test]
    fn separation_ignores_sites_on_unrelated_streets() {
        // Same geometry, but the second intersection shares no street
        // with the first, so the separation check does not apply.
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 30.0, 0.0, 0.0),
            entry(2, (3, 4), 20.0, lat_degrees(100.0), 0.0),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                min_separation_m: 150.0,
                ..params()
            },
        )
        .unwrap();

        assert_eq!(selected_ids(&result), vec![1, 2]);
    }

    #[test]
    fn coverage_radius_covers_street_neighbors_without_selecting_them() {
        // Selecting the first intersection covers its 100 m neighbor on
        // street 1; the neighbor's score counts toward coverage even
        // though no camera is placed there.
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 60.0, 0.0, 0.0),
            entry(2, (1, 3), 40.0, lat_degrees(100.0), 0.0),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                target_coverage: 0.9,
                coverage_radius_m: 150.0,
                ..params()
            },
        )
        .unwrap();

        assert_eq!(selected_ids(&result), vec![1]);
        assert_eq!(result.covered_count, 2);
        assert!((result.coverage_real - 1.0).abs() < 1e-12);
        assert!(result.target_met);
    }

    #[test]
    fn coverage_radius_skips_off_street_neighbors() {
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 60.0, 0.0, 0.0),
            entry(2, (3, 4), 40.0, lat_degrees(100.0), 0.0),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                target_coverage: 0.9,
                coverage_radius_m: 150.0,
                ..params()
            },
        )
        .unwrap();

        // The nearby intersection shares no street, so it stays
        // uncovered and selection continues.
        assert_eq!(selected_ids(&result), vec![1, 2]);
        assert_eq!(result.covered_count, 2);
    }

    #[test]
    fn count_limit_stops_the_walk_and_is_reported() {
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 40.0, 0.0, 0.0),
            entry(2, (3, 4), 30.0, 1.0, 1.0),
            entry(3, (5, 6), 30.0, 2.0, 2.0),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                max_sites: Some(1),
                ..params()
            },
        )
        .unwrap();

        assert_eq!(selected_ids(&result), vec![1]);
        assert!(!result.target_met);
        assert_eq!(result.limiting, Some(LimitingFactor::CountLimit));
    }

    #[test]
    fn site_ceiling_keeps_selecting_past_the_target() {
        // With a ceiling set, the walk does not stop at the coverage
        // target; it runs to the ceiling.
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 60.0, 0.0, 0.0),
            entry(2, (3, 4), 40.0, 1.0, 1.0),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                target_coverage: 0.5,
                max_sites: Some(2),
                ..params()
            },
        )
        .unwrap();

        assert_eq!(selected_ids(&result), vec![1, 2]);
        assert!((result.coverage_real - 1.0).abs() < 1e-12);
        assert!(result.target_met);
        assert_eq!(result.limiting, None);
    }

    #[test]
    fn street_cap_blocks_candidates_touching_a_saturated_street() {
        // Street 1 has 100 points of mass (ids 3 and 4). Covering id 3
        // through the self-crossing site on street 2 attributes 60 to
        // street 1. With a 0.5 cap the next candidate touching street 1
        // must be skipped regardless of its own score.
        let far = lat_degrees(10_000.0);
        let ranked = camera_map_scoring::rank(vec![
            // Far street-2 mass so the shared-street budget absorbs the
            // covering selection. Never selectable itself (street 6 is
            // fully claimed by it), which is fine.
            entry(1, (2, 6), 121.0, far, far),
            // Self-crossing site on street 2, near id 3.
            entry(2, (2, 2), 61.0, lat_degrees(50.0), 0.0),
            entry(3, (1, 2), 60.0, 0.0, 0.0),
            entry(4, (1, 5), 40.0, -far, -far),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                coverage_radius_m: 100.0,
                street_cap: Some(0.5),
                ..params()
            },
        )
        .unwrap();

        // Only the self-crossing site is selectable: it covers id 3,
        // pushing street 1 to 60/100. Id 4 (street 1) is then blocked
        // by the cap, and ids 1/3 are blocked by their own streets.
        assert_eq!(selected_ids(&result), vec![2]);
        assert_eq!(result.covered_count, 2);
        assert!(!result.target_met);
        assert_eq!(result.limiting, Some(LimitingFactor::Constrained));
    }

    #[test]
    fn street_cap_allows_exactly_reaching_the_cap() {
        // Claiming exactly the cap fraction is allowed; only exceeding
        // it blocks. The first site crosses itself so street 1 is its
        // only budget.
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 1), 50.0, 0.0, 0.0),
            entry(2, (1, 3), 50.0, 1.0, 1.0),
        ]);

        let result = allocate(
            &ranked,
            &PlanParams {
                street_cap: Some(0.5),
                ..params()
            },
        )
        .unwrap();

        assert_eq!(selected_ids(&result), vec![1]);
    }

    #[test]
    fn allocation_is_idempotent() {
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 40.0, 0.0, 0.0),
            entry(2, (1, 3), 35.0, lat_degrees(120.0), 0.0),
            entry(3, (2, 3), 25.0, lat_degrees(400.0), 0.0),
        ]);
        let config = PlanParams {
            target_coverage: 0.8,
            min_separation_m: 150.0,
            coverage_radius_m: 200.0,
            max_sites: None,
            street_cap: None,
        };

        let first = allocate(&ranked, &config).unwrap();
        let second = allocate(&ranked, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn raising_the_site_ceiling_never_reduces_coverage() {
        let ranked = camera_map_scoring::rank(vec![
            entry(1, (1, 2), 40.0, 0.0, 0.0),
            entry(2, (1, 3), 35.0, lat_degrees(120.0), 0.0),
            entry(3, (2, 3), 25.0, lat_degrees(400.0), 0.0),
            entry(4, (4, 5), 20.0, lat_degrees(800.0), 0.0),
        ]);

        let mut previous = 0.0;
        for max_sites in 1..=4 {
            let result = allocate(
                &ranked,
                &PlanParams {
                    min_separation_m: 150.0,
                    max_sites: Some(max_sites),
                    ..params()
                },
            )
            .unwrap();
            assert!(
                result.coverage_real >= previous,
                "coverage dropped at max_sites={max_sites}"
            );
            previous = result.coverage_real;
        }
    }

    #[test]
    fn axis_coverage_tracks_covered_axis_mass() {
        let mut high = entry(1, (1, 2), 60.0, 0.0, 0.0);
        high.axis_totals = AxisScores {
            safety: 10.0,
            transit: 0.0,
            commercial: 4.0,
            mobility: 0.0,
        };
        let mut low = entry(2, (3, 4), 40.0, 1.0, 1.0);
        low.axis_totals = AxisScores {
            safety: 10.0,
            transit: 6.0,
            commercial: 0.0,
            mobility: 0.0,
        };

        let ranked = camera_map_scoring::rank(vec![high, low]);
        let result = allocate(
            &ranked,
            &PlanParams {
                target_coverage: 0.6,
                ..params()
            },
        )
        .unwrap();

        // Only the first intersection is covered.
        assert!((result.axis_coverage.safety - 0.5).abs() < 1e-12);
        assert_eq!(result.axis_coverage.transit, 0.0);
        assert!((result.axis_coverage.commercial - 1.0).abs() < 1e-12);
        // No mobility mass anywhere in the dataset.
        assert_eq!(result.axis_coverage.mobility, 0.0);
    }

    #[test]
    fn zero_target_selects_nothing_and_is_met() {
        let ranked = camera_map_scoring::rank(vec![entry(1, (1, 2), 40.0, 0.0, 0.0)]);

        let result = allocate(
            &ranked,
            &PlanParams {
                target_coverage: 0.0,
                ..params()
            },
        )
        .unwrap();

        assert!(result.selected.is_empty());
        assert!(result.target_met);
        assert_eq!(result.limiting, None);
    }
}
