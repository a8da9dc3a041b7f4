/// A piecewise-linear curve of `(x, y)` points, sorted on both axes.
pub(crate) type Curve = Vec<(f32, f32)>;

/// Linearly interpolates `slice` as if it were evenly spread over
/// [0.0, 1.0].
#[inline(always)]
pub fn lerp_slice(slice: &[f32], t: f32) -> f32 {
    let pos = (slice.len() - 1) as f32 * t.max(0.0).min(1.0);
    let i1 = pos as usize;
    let alpha = pos - i1 as f32;

    if i1 >= (slice.len() - 1) {
        slice[slice.len() - 1]
    } else {
        let v1 = slice[i1];
        let v2 = slice[i1 + 1];
        v1 + ((v2 - v1) * alpha)
    }
}

// Returns the x value at the given y value.
//
// Outside the curve's extent it interpolates towards (0, 0) and (1, 1).
pub(crate) fn lerp_curve_at_y(curve: &[(f32, f32)], t: f32) -> f32 {
    let (p1, p2) = match curve.binary_search_by(|v| v.1.total_cmp(&t)) {
        Ok(i) => return curve[i].0, // Early out.
        Err(i) => {
            if i == 0 {
                ((0.0f32, 0.0f32), curve[i])
            } else if i == curve.len() {
                (curve[i - 1], (1.0f32, 1.0f32))
            } else {
                (curve[i - 1], curve[i])
            }
        }
    };

    if p2.1 <= p1.1 {
        return p1.0;
    }
    let alpha = (t - p1.1) / (p2.1 - p1.1);
    p1.0 + ((p2.0 - p1.0) * alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_slice_endpoints() {
        let s = [0.0f32, 0.5, 2.0];
        assert_eq!(lerp_slice(&s, 0.0), 0.0);
        assert_eq!(lerp_slice(&s, 0.25), 0.25);
        assert_eq!(lerp_slice(&s, 0.75), 1.25);
        assert_eq!(lerp_slice(&s, 1.0), 2.0);
        assert_eq!(lerp_slice(&s, 1.5), 2.0);
    }

    #[test]
    fn curve_at_y() {
        let curve = vec![(0.25f32, 0.5f32), (0.5, 0.75)];
        assert_eq!(lerp_curve_at_y(&curve, 0.5), 0.25);
        assert_eq!(lerp_curve_at_y(&curve, 0.625), 0.375);
        assert_eq!(lerp_curve_at_y(&curve, 0.25), 0.125);
        assert_eq!(lerp_curve_at_y(&curve, 0.875), 0.75);
    }
}
