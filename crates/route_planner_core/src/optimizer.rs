//! Greedy stop ordering.
//!
//! Nearest-neighbor over a full haversine matrix: start at the first stop,
//! repeatedly hop to the closest stop not yet visited. O(n²) and not optimal,
//! which is fine for the handful of stops a manual selection produces.

use rayon::prelude::*;

use crate::point::Located;

const MAX_STOPS_WITH_TRIVIAL_ORDER: usize = 2;
/// Below this many stops the matrix is filled on the current thread.
const PARALLEL_MATRIX_THRESHOLD: usize = 64;

/// Returns the stops in nearest-neighbor visiting order.
///
/// The input is never reordered in place. Ties go to the stop that comes
/// first in input order, so the result is deterministic for a given input.
pub fn optimal_order<T>(stops: &[T]) -> Vec<T>
where
    T: Located + Clone + Sync,
{
    if stops.len() <= MAX_STOPS_WITH_TRIVIAL_ORDER {
        log::debug!("optimizer: skip n={} reason=trivial", stops.len());
        return stops.to_vec();
    }

    let matrix = distance_matrix(stops);
    let order = nearest_neighbor_order(&matrix, stops.len());
    log::debug!("optimizer: done n={} order={order:?}", stops.len());

    order.into_iter().map(|idx| stops[idx].clone()).collect()
}

/// Row-major `n x n` haversine matrix in kilometers.
pub(crate) fn distance_matrix<T>(stops: &[T]) -> Vec<f64>
where
    T: Located + Sync,
{
    let n = stops.len();
    let row = |i: usize| -> Vec<f64> {
        let a = stops[i].point();
        (0..n)
            .map(|j| {
                if i == j {
                    0.0
                } else {
                    a.haversine_km(&stops[j].point())
                }
            })
            .collect()
    };

    if n < PARALLEL_MATRIX_THRESHOLD {
        (0..n).flat_map(row).collect()
    } else {
        (0..n).into_par_iter().flat_map_iter(row).collect()
    }
}

pub(crate) fn nearest_neighbor_order(matrix: &[f64], n: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = 0usize;
    visited[current] = true;
    order.push(current);

    for _ in 1..n {
        let mut nearest = None;
        let mut min_distance = f64::INFINITY;
        for (j, &seen) in visited.iter().enumerate() {
            let d = matrix[current * n + j];
            // strict: the first minimum in scan order wins
            if !seen && d < min_distance {
                min_distance = d;
                nearest = Some(j);
            }
        }

        let Some(next) = nearest else {
            break;
        };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}

#[cfg(test)]
mod tests {
    use super::{distance_matrix, nearest_neighbor_order, optimal_order};
    use crate::point::{GeoPoint, Located};

    #[derive(Clone, Debug, PartialEq)]
    struct Stop {
        name: &'static str,
        at: GeoPoint,
    }

    impl Located for Stop {
        fn point(&self) -> GeoPoint {
            self.at
        }
    }

    fn stop(name: &'static str, lat: f64, lon: f64) -> Stop {
        Stop {
            name,
            at: GeoPoint::new(lat, lon),
        }
    }

    fn names(stops: &[Stop]) -> Vec<&'static str> {
        stops.iter().map(|s| s.name).collect()
    }

    #[test]
    fn two_or_fewer_stops_are_returned_unchanged() {
        let empty: Vec<Stop> = Vec::new();
        assert!(optimal_order(&empty).is_empty());

        let one = vec![stop("a", 10.0, 10.0)];
        assert_eq!(optimal_order(&one), one);

        let two = vec![stop("far", 50.0, 50.0), stop("near", 0.0, 0.0)];
        assert_eq!(optimal_order(&two), two);
    }

    #[test]
    fn points_on_a_line_keep_their_order() {
        let stops = vec![stop("a", 0.0, 0.0), stop("b", 0.0, 1.0), stop("c", 0.0, 2.0)];
        assert_eq!(names(&optimal_order(&stops)), vec!["a", "b", "c"]);
    }

    #[test]
    fn visits_nearest_unvisited_stop_first() {
        let stops = vec![
            stop("start", 0.0, 0.0),
            stop("far", 0.0, 5.0),
            stop("near", 0.0, 1.0),
            stop("mid", 0.0, 3.0),
        ];
        assert_eq!(
            names(&optimal_order(&stops)),
            vec!["start", "near", "mid", "far"]
        );
    }

    #[test]
    fn always_starts_at_first_input_stop() {
        let stops = vec![stop("mid", 0.0, 1.0), stop("west", 0.0, 0.0), stop("east", 0.0, 2.0)];
        let order = optimal_order(&stops);
        assert_eq!(order[0].name, "mid");
        // Equidistant neighbours: the earlier one in input order wins.
        assert_eq!(names(&order), vec!["mid", "west", "east"]);
    }

    #[test]
    fn deterministic_and_does_not_mutate_input() {
        let stops = vec![
            stop("a", 40.7128, -74.0060),
            stop("b", 34.0522, -118.2437),
            stop("c", 41.8781, -87.6298),
            stop("d", 29.7604, -95.3698),
            stop("e", 39.9526, -75.1652),
        ];
        let snapshot = stops.clone();

        let first = optimal_order(&stops);
        let second = optimal_order(&stops);

        assert_eq!(first, second);
        assert_eq!(stops, snapshot);
        assert_eq!(names(&first), vec!["a", "e", "c", "d", "b"]);
    }

    #[test]
    fn duplicate_coordinates_keep_input_order() {
        let stops = vec![stop("a", 1.0, 1.0), stop("b", 1.0, 1.0), stop("c", 1.0, 1.0)];
        assert_eq!(names(&optimal_order(&stops)), vec!["a", "b", "c"]);
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let stops = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(-3.0, 2.0),
        ];
        let m = distance_matrix(&stops);
        for i in 0..3 {
            assert_eq!(m[i * 3 + i], 0.0);
            for j in 0..3 {
                assert!((m[i * 3 + j] - m[j * 3 + i]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn large_inputs_visit_every_stop_once() {
        let stops: Vec<GeoPoint> = (0..100)
            .map(|i| GeoPoint::new((i % 10) as f64 * 0.1, (i / 10) as f64 * 0.1))
            .collect();
        let matrix = distance_matrix(&stops);
        let mut order = nearest_neighbor_order(&matrix, stops.len());
        assert_eq!(order[0], 0);
        order.sort_unstable();
        assert_eq!(order, (0..100).collect::<Vec<_>>());
    }
}
