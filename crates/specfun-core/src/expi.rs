//! Exponential integral `Ei(z)`.
//!
//! `Ei` has a branch cut along the negative real axis. Real inputs there give
//! the real value `-E1(-x)`; complex inputs just above (below) the cut pick up
//! `+iπ` (`-iπ`), matching the usual principal-branch convention. Near the
//! positive real axis the function is continuous and the asymptotic expansion
//! applies directly.

use std::f64::consts::PI;

use num_complex::Complex64;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
const SERIES_RADIUS: f64 = 2.0;
const ASYMPTOTIC_RADIUS: f64 = 40.0;
const MAX_SERIES_TERMS: usize = 1_000;
const MAX_FRACTION_TERMS: usize = 10_000;

/// Exponential integral for real `x`. `Ei(0) = -inf`.
#[must_use]
pub fn expi(x: f64) -> f64 {
    if x == f64::INFINITY {
        return f64::INFINITY;
    }
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    expi_complex(Complex64::new(x, 0.0)).re
}

/// Exponential integral for complex `z`.
#[must_use]
pub fn expi_complex(z: Complex64) -> Complex64 {
    if z.re.is_nan() || z.im.is_nan() {
        return Complex64::new(f64::NAN, f64::NAN);
    }
    if z.re == 0.0 && z.im == 0.0 {
        return Complex64::new(f64::NEG_INFINITY, 0.0);
    }

    let r = z.norm();
    let near_positive_axis = z.re > 0.0 && z.im.abs() <= z.re;
    let value = if r <= SERIES_RADIUS || (near_positive_axis && r <= ASYMPTOTIC_RADIUS) {
        series(z)
    } else if near_positive_axis {
        asymptotic(z)
    } else {
        -e1_continued_fraction(-z) + branch_offset(z)
    };

    if z.im == 0.0 {
        Complex64::new(value.re, 0.0)
    } else {
        value
    }
}

/// `±iπ` depending on the side of the real axis; zero on the axis itself.
fn branch_offset(z: Complex64) -> Complex64 {
    if z.im > 0.0 {
        Complex64::new(0.0, PI)
    } else if z.im < 0.0 {
        Complex64::new(0.0, -PI)
    } else {
        Complex64::new(0.0, 0.0)
    }
}

/// `γ + ln z + Σ z^k / (k k!)`, with the real logarithm on the negative axis.
pub(crate) fn series(z: Complex64) -> Complex64 {
    let log = if z.im == 0.0 {
        Complex64::new(z.re.abs().ln(), 0.0)
    } else {
        z.ln()
    };

    let mut sum = Complex64::new(0.0, 0.0);
    let mut power = Complex64::new(1.0, 0.0);
    for k in 1..=MAX_SERIES_TERMS {
        let kf = k as f64;
        power = power * z / kf;
        let term = power / kf;
        sum += term;
        if term.norm() <= f64::EPSILON * sum.norm() {
            break;
        }
    }
    sum + EULER_GAMMA + log
}

/// `e^z / z Σ k! / z^k`, truncated at the smallest term.
pub(crate) fn asymptotic(z: Complex64) -> Complex64 {
    let mut sum = Complex64::new(1.0, 0.0);
    let mut term = Complex64::new(1.0, 0.0);
    let mut previous = f64::INFINITY;
    for k in 1..MAX_SERIES_TERMS {
        let next = term * (k as f64) / z;
        let size = next.norm();
        if size >= previous {
            break;
        }
        term = next;
        sum += term;
        previous = size;
        if size <= f64::EPSILON * sum.norm() {
            break;
        }
    }
    z.exp() / z * sum
}

/// `E1(w)` by the modified Lentz evaluation of its continued fraction.
pub(crate) fn e1_continued_fraction(w: Complex64) -> Complex64 {
    let tiny = 1e-300;
    let mut b = w + 1.0;
    let mut c = Complex64::new(1.0 / tiny, 0.0);
    let mut d = b.inv();
    let mut h = d;
    for i in 1..MAX_FRACTION_TERMS {
        let an = -((i * i) as f64);
        b += 2.0;
        d = an * d + b;
        if d.norm() < tiny {
            d = Complex64::new(tiny, 0.0);
        }
        d = d.inv();
        c = b + an / c;
        if c.norm() < tiny {
            c = Complex64::new(tiny, 0.0);
        }
        let delta = c * d;
        h *= delta;
        if (delta - 1.0).norm() <= f64::EPSILON {
            break;
        }
    }
    h * (-w).exp()
}
