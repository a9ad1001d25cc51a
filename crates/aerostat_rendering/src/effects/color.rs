//! HSL colour conversion for per-instance vertex colours.

/// Converts HSL to RGB, all components in `[0, 1]`.
///
/// Hue wraps, so `-0.05` is the same as `0.95`. Saturation and lightness are
/// clamped.
#[must_use]
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

#[inline]
fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_primary_hues() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_grey_when_unsaturated() {
        assert!(close(hsl_to_rgb(0.4, 0.0, 0.3), [0.3, 0.3, 0.3]));
    }

    #[test]
    fn test_negative_hue_wraps() {
        assert!(close(hsl_to_rgb(-0.05, 1.0, 0.6), hsl_to_rgb(0.95, 1.0, 0.6)));
    }

    #[test]
    fn test_flame_start_is_warm() {
        let [r, g, b] = hsl_to_rgb(0.15, 1.0, 0.6);
        assert!(r > g && g > b);
        assert!((r - 1.0).abs() < 1e-5);
    }
}
