//! Visual separation of bodies that would draw on top of each other
//!
//! Planets in conjunction (or a planet and its moons) can sit almost on the
//! same line of sight. This nudges the higher-id body of each close pair away
//! from the lower-id one. It is a display approximation; positions returned
//! here are never fed back into the catalog.

use nalgebra::Vector3;
use starfield::BodyId;

/// Moves allowed per body before it is left where it is
const MAX_PASSES: usize = 8;

/// Push apart pairs closer than `min_separation`
///
/// Bodies are visited in ascending id order and lower-id bodies never move.
/// A body closer than `min_separation` to any lower-id body is moved away
/// from the centroid of its lower-id neighbours within `push_separation`,
/// just far enough to be `push_separation` from each of them. The move is
/// re-checked against every lower-id body and repeated (bounded by
/// `MAX_PASSES`) if it landed near another one. Coincident positions use a
/// direction perpendicular to the centroid, so the result is deterministic.
///
/// # Arguments
/// * `bodies` - Id and world position of every candidate body
/// * `min_separation` - Distance below which a pair counts as overlapping
/// * `push_separation` - Distance a moved body keeps from its neighbours
///
/// # Returns
/// Number of moves applied
pub fn separate_overlaps(
    bodies: &mut [(BodyId, Vector3<f64>)],
    min_separation: f64,
    push_separation: f64,
) -> usize {
    let mut order: Vec<usize> = (0..bodies.len()).collect();
    order.sort_by_key(|&i| bodies[i].0);

    let mut pushes = 0;
    for (rank, &higher) in order.iter().enumerate() {
        let lower: Vec<Vector3<f64>> = order[..rank].iter().map(|&i| bodies[i].1).collect();
        for _ in 0..MAX_PASSES {
            let position = bodies[higher].1;
            let overlapping = lower
                .iter()
                .any(|p| (position - p).norm() < min_separation);
            if !overlapping {
                break;
            }
            bodies[higher].1 = push_clear(position, &lower, push_separation);
            pushes += 1;
        }
    }
    pushes
}

/// Move `position` away from its close neighbours until each is `clearance` away
fn push_clear(position: Vector3<f64>, others: &[Vector3<f64>], clearance: f64) -> Vector3<f64> {
    let near: Vec<&Vector3<f64>> = others
        .iter()
        .filter(|p| (position - *p).norm() < clearance)
        .collect();
    let centroid = near.iter().copied().sum::<Vector3<f64>>() / near.len().max(1) as f64;
    let direction = (position - centroid)
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(|| fallback_direction(&centroid));

    // Smallest t >= 0 with |position + t * direction - p| >= clearance for every p
    let travel = near
        .iter()
        .map(|p| {
            let offset = position - *p;
            let along = offset.dot(&direction);
            let inside = along * along - offset.norm_squared() + clearance * clearance;
            -along + inside.max(0.0).sqrt()
        })
        .fold(0.0, f64::max);
    position + direction * travel
}

fn fallback_direction(anchor: &Vector3<f64>) -> Vector3<f64> {
    anchor
        .cross(&Vector3::z())
        .try_normalize(f64::EPSILON)
        .or_else(|| anchor.cross(&Vector3::x()).try_normalize(f64::EPSILON))
        .unwrap_or_else(Vector3::x)
}
