//! Utilities for margin functions and value-function evaluation.

/// Signed distance from a point to an axis-aligned rectangle, negative
/// inside. Suitable as a target margin `l(x)`.
pub fn signed_dist_rect(state: &[f32], min: &[f32], max: &[f32]) -> f32 {
    state
        .iter()
        .zip(min.iter().zip(max.iter()))
        .map(|(x, (lo, hi))| (lo - x).max(x - hi))
        .fold(f32::NEG_INFINITY, f32::max)
}

/// Signed penetration of a point into an axis-aligned rectangular obstacle,
/// positive inside. Suitable as a safety margin `g(x)`.
pub fn signed_dist_rect_obstacle(state: &[f32], min: &[f32], max: &[f32]) -> f32 {
    state
        .iter()
        .zip(min.iter().zip(max.iter()))
        .map(|(x, (lo, hi))| (x - lo).min(hi - x))
        .fold(f32::INFINITY, f32::min)
}

/// False-positive and false-negative rates of a learned value function
/// against ground truth.
///
/// A prediction counts as success when `pred_v > 0`; the ground truth counts
/// as success when `gt_v < 0` (the environment convention is `V(x) < 0`
/// inside the winning set).
pub fn false_rates(pred_v: &[f32], gt_v: &[f32]) -> (f32, f32) {
    let mut fp = 0usize;
    let mut fns = 0usize;
    let mut tp = 0usize;
    let mut tn = 0usize;
    for (&p, &g) in pred_v.iter().zip(gt_v.iter()) {
        let pred_success = p > 0.0;
        let gt_success = g < 0.0;
        match (gt_success, pred_success) {
            (false, true) => fp += 1,
            (true, false) => fns += 1,
            (true, true) => tp += 1,
            (false, false) => tn += 1,
        }
    }
    (
        fp as f32 / (fp + tn) as f32,
        fns as f32 / (fns + tp) as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: [f32; 2] = [-1.0, -1.0];
    const MAX: [f32; 2] = [1.0, 1.0];

    #[test]
    fn test_signed_dist_rect() {
        // center is inside, one unit from every wall
        assert_eq!(signed_dist_rect(&[0.0, 0.0], &MIN, &MAX), -1.0);
        // outside along x
        assert_eq!(signed_dist_rect(&[2.0, 0.0], &MIN, &MAX), 1.0);
        // boundary
        assert_eq!(signed_dist_rect(&[1.0, 0.5], &MIN, &MAX), 0.0);
    }

    #[test]
    fn test_signed_dist_rect_obstacle() {
        // positive inside the obstacle
        assert_eq!(signed_dist_rect_obstacle(&[0.0, 0.0], &MIN, &MAX), 1.0);
        // negative outside
        assert_eq!(signed_dist_rect_obstacle(&[2.0, 0.0], &MIN, &MAX), -1.0);
    }

    #[test]
    fn test_false_rates() {
        // gt success is v < 0, pred success is v > 0
        let gt = [-1.0, -1.0, 1.0, 1.0];
        let pred = [1.0, -1.0, 1.0, -1.0];
        let (fp_rate, fn_rate) = false_rates(&pred, &gt);
        assert_eq!(fp_rate, 0.5);
        assert_eq!(fn_rate, 0.5);
    }
}
