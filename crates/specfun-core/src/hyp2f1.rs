//! Gauss hypergeometric function `2F1(a, b; c; z)` for real arguments.
//!
//! Region selection:
//! - `a` or `b` a non-positive integer: terminating polynomial, valid for all `z`.
//! - `c` a non-positive integer otherwise: pole, `+inf`.
//! - `z < 0`: Pfaff transformation onto `z / (z - 1)` in `(0, 1)`, keeping
//!   whichever of the two Pfaff images cancels less.
//! - `0 < z <= 0.75`, or `c - a - b` (near) integer: direct power series.
//! - `0.75 < z < 1`: `1 - z` connection formula.
//! - `z == 1`: Gauss summation; `z > 1`: the value is complex, NaN.
//!
//! When `a = c` or `b = c` is a negative integer the polynomial convention wins
//! over the `(1 - z)^-a` closed form.

use crate::gamma::gamma_ratio;

const MAX_TERMS: usize = 500_000;
const SERIES_LIMIT: f64 = 0.75;
const INTEGER_SLACK: f64 = 1e-9;

/// Gauss hypergeometric function `2F1(a, b; c; z)`.
///
/// Returns NaN when the result is complex (`z > 1` without termination) or when
/// the power series fails to converge.
#[must_use]
pub fn hyp2f1(a: f64, b: f64, c: f64, z: f64) -> f64 {
    if a.is_nan() || b.is_nan() || c.is_nan() || z.is_nan() {
        return f64::NAN;
    }
    if z == 0.0 {
        return 1.0;
    }

    let terminating = match (nonpositive_integer(a), nonpositive_integer(b)) {
        (Some(n), Some(m)) if m < n => Some((b, a, m)),
        (Some(n), _) => Some((a, b, n)),
        (None, Some(m)) => Some((b, a, m)),
        (None, None) => None,
    };
    if let Some((stop, other, degree)) = terminating {
        if let Some(m) = nonpositive_integer(c)
            && m < degree
        {
            return f64::INFINITY;
        }
        return polynomial(stop, other, c, z, degree);
    }
    if nonpositive_integer(c).is_some() {
        return f64::INFINITY;
    }

    if c == a {
        return (1.0 - z).powf(-b);
    }
    if c == b {
        return (1.0 - z).powf(-a);
    }

    if z == 1.0 {
        let s = c - a - b;
        if s <= 0.0 {
            return f64::INFINITY;
        }
        return gamma_ratio(&[c, s], &[c - a, c - b]);
    }
    if z > 1.0 {
        return f64::NAN;
    }
    if z < 0.0 {
        return pfaff(a, b, c, z);
    }

    let s = c - a - b;
    if z <= SERIES_LIMIT || (s - s.round()).abs() < INTEGER_SLACK {
        power_series(a, b, c, z)
    } else {
        connection_one_minus_z(a, b, c, z)
    }
}

/// `Some(n)` when `x == -n` for a non-negative integer `n`.
fn nonpositive_integer(x: f64) -> Option<u64> {
    if x <= 0.0 && x.fract() == 0.0 && x > -1e15 {
        Some((-x) as u64)
    } else {
        None
    }
}

/// Terminating series where `stop = -degree`.
///
/// Evaluates both the direct sum and its Pfaff image and keeps whichever
/// suffers less cancellation.
fn polynomial(stop: f64, other: f64, c: f64, z: f64, degree: u64) -> f64 {
    let (direct, direct_mass) = polynomial_sum(stop, other, c, z, degree);
    if z == 1.0 || direct == 0.0 {
        return direct;
    }

    let w = z / (z - 1.0);
    let (image, image_mass) = polynomial_sum(stop, c - other, c, w, degree);
    if image != 0.0 && image_mass / image.abs() < direct_mass / direct.abs() {
        (1.0 - z).powf(-stop) * image
    } else {
        direct
    }
}

/// Returns the sum together with the sum of absolute terms.
fn polynomial_sum(a: f64, b: f64, c: f64, z: f64, degree: u64) -> (f64, f64) {
    let mut sum = 1.0;
    let mut mass = 1.0;
    let mut term = 1.0;
    for k in 0..degree {
        let k = k as f64;
        term *= (a + k) * (b + k) / ((c + k) * (k + 1.0)) * z;
        sum += term;
        mass += term.abs();
    }
    (sum, mass)
}

/// `x - y` as the unevaluated sum `hi + lo` (two-sum).
fn two_diff(x: f64, y: f64) -> (f64, f64) {
    let hi = x - y;
    let v = hi - x;
    let lo = (x - (hi - v)) + (-y - v);
    (hi, lo)
}

/// Pfaff transformation for `z < 0`, with `w = z / (z - 1)`:
/// `(1 - z)^-a 2F1(a, c - b; c; w)` or `(1 - z)^-b 2F1(c - a, b; c; w)`.
///
/// `c - a` and `c - b` keep their rounding error, so a difference that only
/// rounds to a non-positive integer does not cut the series short.
fn pfaff(a: f64, b: f64, c: f64, z: f64) -> f64 {
    let w = z / (z - 1.0);
    if w > SERIES_LIMIT {
        return (1.0 - z).powf(-a) * hyp2f1(a, c - b, c, w);
    }

    let (via_a, mass_a) = series_sum((a, 0.0), two_diff(c, b), c, w);
    let (via_b, mass_b) = series_sum(two_diff(c, a), (b, 0.0), c, w);
    if cancellation(via_b, mass_b) < cancellation(via_a, mass_a) {
        (1.0 - z).powf(-b) * via_b
    } else {
        (1.0 - z).powf(-a) * via_a
    }
}

/// Ratio of absolute term mass to the sum; infinite when the sum is unusable.
fn cancellation(sum: f64, mass: f64) -> f64 {
    if sum.is_finite() && sum != 0.0 {
        mass / sum.abs()
    } else {
        f64::INFINITY
    }
}

fn power_series(a: f64, b: f64, c: f64, z: f64) -> f64 {
    series_sum((a, 0.0), (b, 0.0), c, z).0
}

/// Power series with `a` and `b` given as `hi + lo` pairs. Returns the sum
/// together with the sum of absolute terms.
fn series_sum(a: (f64, f64), b: (f64, f64), c: f64, z: f64) -> (f64, f64) {
    // The term ratio only settles towards z once k passes the parameters.
    let settle = a.0.abs().max(b.0.abs()).max(c.abs());
    let mut sum = 1.0;
    let mut mass = 1.0;
    let mut term = 1.0;
    let mut quiet = 0;
    for k in 0..MAX_TERMS {
        let k = k as f64;
        term *= ((a.0 + k) + a.1) * ((b.0 + k) + b.1) / ((c + k) * (k + 1.0)) * z;
        sum += term;
        mass += term.abs();
        if !sum.is_finite() {
            return (sum, mass);
        }
        if term.abs() <= f64::EPSILON * sum.abs() && k > settle {
            quiet += 1;
            if quiet >= 3 {
                return (sum, mass);
            }
        } else {
            quiet = 0;
        }
    }
    (f64::NAN, mass)
}

/// DLMF 15.8.4 for `0 < z < 1` with `c - a - b` not an integer.
fn connection_one_minus_z(a: f64, b: f64, c: f64, z: f64) -> f64 {
    let w = 1.0 - z;
    let s = c - a - b;
    let head = gamma_ratio(&[c, s], &[c - a, c - b]);
    let tail = gamma_ratio(&[c, -s], &[a, b]);

    let mut value = 0.0;
    if head != 0.0 {
        value += head * hyp2f1(a, b, 1.0 - s, w);
    }
    if tail != 0.0 {
        value += w.powf(s) * tail * hyp2f1(c - a, c - b, 1.0 + s, w);
    }
    value
}
