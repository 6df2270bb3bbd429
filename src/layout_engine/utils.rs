use crate::geometry::{Rect, RectDelta};

/// Narrowest span a weighted part may be squeezed to by a resize.
const MIN_PART_LENGTH: i32 = 1;

pub fn clip<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Moves `value` to the next multiple of `step` in the direction of `step`.
/// Values already off-grid snap to the grid first.
pub fn slide(value: f64, step: f64) -> f64 {
    if step == 0.0 {
        return value;
    }
    ((value / step) + 1.000001).floor() * step
}

/// Largest offset up to `step` that leaves `extent - offset * (count - 1)`
/// positive, so `count` staggered copies of a rect keep a non-empty size.
pub fn fit_step(step: i32, extent: i32, count: i32) -> i32 {
    if count <= 1 {
        return step;
    }
    step.min((extent - 1).max(0) / (count - 1))
}

pub fn wrap_index(index: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.rem_euclid(len as isize) as usize
}

/// Splits the line `[begin, begin + length)` into parts proportional to
/// `weights`, leaving `gap` between neighbours. Returns `(begin, length)`.
pub fn split_weighted(begin: i32, length: i32, weights: &[f64], gap: i32) -> Vec<(i32, i32)> {
    let n = weights.len();
    if n == 0 {
        return vec![];
    }
    let actual = f64::from((length - (n as i32 - 1) * gap).max(0));
    let sum: f64 = weights.iter().sum();
    // Degenerate weights fall back to an even split.
    let uniform = sum <= 0.0 || !sum.is_finite();
    let sum = if uniform { n as f64 } else { sum };
    let mut acc = 0.0;
    weights
        .iter()
        .enumerate()
        .map(|(i, &weight)| {
            let weight = if uniform { 1.0 } else { weight };
            let part_begin = actual * acc / sum + (i as i32 * gap) as f64;
            let part_length = actual * weight / sum;
            acc += weight;
            (begin + part_begin.floor() as i32, part_length.floor() as i32)
        })
        .collect()
}

pub fn split_area_weighted(area: Rect, weights: &[f64], gap: i32, horizontal: bool) -> Vec<Rect> {
    let (begin, length) = if horizontal { (area.x, area.width) } else { (area.y, area.height) };
    split_weighted(begin, length, weights, gap)
        .into_iter()
        .map(|(b, l)| {
            if horizontal {
                Rect::new(b, area.y, l, area.height)
            } else {
                Rect::new(area.x, b, area.width, l)
            }
        })
        .collect()
}

pub fn split_area_half_weighted(area: Rect, weight: f64, gap: i32, horizontal: bool) -> (Rect, Rect) {
    let parts = split_area_weighted(area, &[weight, 1.0 - weight], gap, horizontal);
    (parts[0], parts[1])
}

fn weights_of(parts: &[(i32, i32)]) -> Vec<f64> {
    let total: i32 = parts.iter().map(|&(_, l)| l).sum();
    if total <= 0 {
        return vec![1.0 / parts.len() as f64; parts.len()];
    }
    parts.iter().map(|&(_, l)| f64::from(l) / f64::from(total)).collect()
}

/// Moves the boundaries on either side of part `target` by the forward
/// and backward deltas and returns normalized weights for the new split.
pub fn adjust_weights(
    length: i32,
    weights: &[f64],
    gap: i32,
    target: usize,
    delta_forward: f64,
    delta_backward: f64,
) -> Vec<f64> {
    let mut parts = split_weighted(0, length, weights, gap);
    if target >= parts.len() {
        return weights_of(&parts);
    }

    if target > 0 && delta_backward != 0.0 {
        let neighbor = target - 1;
        let (target_base, target_len) = parts[target];
        let (neighbor_base, neighbor_len) = parts[neighbor];
        let delta = clip(
            delta_backward.round() as i32,
            MIN_PART_LENGTH - target_len,
            neighbor_len - MIN_PART_LENGTH,
        );
        parts[target] = (target_base - delta, target_len + delta);
        parts[neighbor] = (neighbor_base, neighbor_len - delta);
    }

    if target + 1 < parts.len() && delta_forward != 0.0 {
        let neighbor = target + 1;
        let (target_base, target_len) = parts[target];
        let (neighbor_base, neighbor_len) = parts[neighbor];
        let delta = clip(
            delta_forward.round() as i32,
            MIN_PART_LENGTH - target_len,
            neighbor_len - MIN_PART_LENGTH,
        );
        parts[target] = (target_base, target_len + delta);
        parts[neighbor] = (neighbor_base + delta, neighbor_len - delta);
    }

    weights_of(&parts)
}

pub fn adjust_area_weights(
    area: Rect,
    weights: &[f64],
    gap: i32,
    target: usize,
    delta: RectDelta,
    horizontal: bool,
) -> Vec<f64> {
    let (length, forward, backward) = if horizontal {
        (area.width, delta.right, delta.left)
    } else {
        (area.height, delta.bottom, delta.top)
    };
    adjust_weights(length, weights, gap, target, forward, backward)
}

pub fn adjust_area_half_weights(
    area: Rect,
    weight: f64,
    gap: i32,
    target: usize,
    delta: RectDelta,
    horizontal: bool,
) -> f64 {
    adjust_area_weights(area, &[weight, 1.0 - weight], gap, target, delta, horizontal)[0]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn split_weighted_honours_gap() {
        assert_eq!(split_weighted(0, 100, &[1.0, 1.0], 0), vec![(0, 50), (50, 50)]);
        assert_eq!(split_weighted(10, 110, &[1.0, 1.0], 10), vec![(10, 50), (70, 50)]);
        assert_eq!(split_weighted(0, 90, &[2.0, 1.0], 0), vec![(0, 60), (60, 30)]);
    }

    #[test]
    fn adjust_moves_shared_boundary() {
        let weights = adjust_weights(100, &[0.5, 0.5], 0, 0, 10.0, 0.0);
        assert_eq!(weights, vec![0.6, 0.4]);
        let weights = adjust_weights(100, &[0.5, 0.5], 0, 1, 0.0, 10.0);
        assert_eq!(weights, vec![0.4, 0.6]);
    }

    #[test]
    fn adjust_never_squeezes_neighbor_away() {
        let weights = adjust_weights(100, &[0.5, 0.5], 0, 0, 500.0, 0.0);
        assert_eq!(weights, vec![0.99, 0.01]);
    }

    #[test]
    fn slide_snaps_to_step_grid() {
        assert!((slide(0.5, 0.05) - 0.55).abs() < 1e-9);
        assert!((slide(0.5, -0.05) - 0.45).abs() < 1e-9);
        assert!((slide(0.52, -0.05) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn wrap_index_handles_negatives() {
        assert_eq!(wrap_index(-1, 3), 2);
        assert_eq!(wrap_index(3, 3), 0);
        assert_eq!(wrap_index(1, 0), 0);
    }
}
