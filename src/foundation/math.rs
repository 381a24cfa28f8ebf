pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Map a unit float to a byte, clamping and treating NaN as zero.
pub(crate) fn unit_to_u8(x: f32) -> u8 {
    if !x.is_finite() {
        return 0;
    }
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Clamp `v` into `[lo, hi]`, replacing non-finite values with `fallback`.
pub(crate) fn clamp_finite(v: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}

/// HSL (hue in degrees, s/l in 0..1) to straight RGB8.
pub(crate) fn hsl_to_rgb8(h_deg: f64, s: f64, l: f64) -> [u8; 3] {
    let h = (h_deg % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let to_u8 = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;

    if s == 0.0 {
        let v = to_u8(l);
        return [v, v, v];
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    [
        to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_rgb(p, q, h)),
        to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
