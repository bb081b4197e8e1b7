//! Input grids for the reference checks.

use std::f64::consts::PI;

use num_complex::Complex64;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::version::Version;

/// Seed of the catalog's random hyp2f1 grid.
pub const RANDOM_SEED: u64 = 1234;

/// Points in the catalog's random hyp2f1 grid.
pub const RANDOM_POINTS: usize = 500;

/// Shape of the Lomax (Pareto II) draw for random parameters.
pub const PARETO_SHAPE: f64 = 1.5;

/// References older than this lose accuracy when `|c|` is much smaller than
/// `|a|` or `|b|`.
const SMALL_C_FIX: &str = "0.14";

/// `num` evenly spaced samples over `[start, stop]`, endpoints included.
#[must_use]
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut out: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            out[num - 1] = stop;
            out
        }
    }
}

/// `10^e` for `e` in `linspace(start, stop, num)`.
#[must_use]
pub fn logspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    linspace(start, stop, num)
        .into_iter()
        .map(|e| 10.0_f64.powf(e))
        .collect()
}

/// Polar grid for `Ei(z)`: ten radii from `1e-99` to `100` times thirty
/// angles around the full circle.
#[must_use]
pub fn expi_complex_grid() -> Vec<Vec<Complex64>> {
    let angles = linspace(0.0, 2.0 * PI, 30);
    logspace(-99.0, 2.0, 10)
        .into_iter()
        .flat_map(|r| {
            angles
                .iter()
                .map(move |&phi| vec![Complex64::from_polar(r, phi)])
        })
        .collect()
}

/// Points where `a = c` or `b = c` is a negative integer. The library takes
/// the terminating polynomial there; other conventions differ.
#[must_use]
pub fn hyp2f1_strange_points() -> Vec<Vec<f64>> {
    vec![vec![2.0, -1.0, -1.0, 3.0], vec![2.0, -2.0, -2.0, 3.0]]
}

/// Hand-picked points, including some with known closed forms.
#[must_use]
pub fn hyp2f1_some_points() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 2.0, 3.0, 0.0],
        vec![1.0 / 3.0, 2.0 / 3.0, 5.0 / 6.0, 27.0 / 32.0],
        vec![1.0 / 4.0, 1.0 / 2.0, 3.0 / 4.0, 80.0 / 81.0],
        vec![2.0, -2.0, -3.0, 3.0],
        vec![2.0, -3.0, -2.0, 3.0],
        vec![2.0, -1.5, -1.5, 3.0],
        vec![1.0, 2.0, 3.0, 0.0],
        vec![0.7235, -1.0, -5.0, 0.3],
        vec![0.25, 1.0 / 3.0, 2.0, 0.999],
        vec![0.25, 1.0 / 3.0, 2.0, -1.0],
        vec![2.0, 3.0, 5.0, 0.99],
        vec![3.0 / 2.0, -0.5, 3.0, 0.99],
        vec![2.0, 2.5, -3.25, 0.999],
    ]
}

/// Large `a` with `z` near `-1`; old references fail to converge here.
#[must_use]
pub fn hyp2f1_some_points_2() -> Vec<Vec<f64>> {
    vec![vec![112.0, 51.0 / 10.0, -9.0 / 10.0, -0.99999]]
}

/// Cartesian grid over mixed-sign parameters and `z` on both sides of the
/// unit interval. 768 points; the reference drops those without a real value.
#[must_use]
pub fn hyp2f1_real_grid() -> Vec<Vec<f64>> {
    const A: [f64; 6] = [-10.0, -5.0, -1.8, 1.8, 5.0, 10.0];
    const B: [f64; 4] = [-2.5, -1.0, 1.0, 7.4];
    const C: [f64; 4] = [-9.0, -1.8, 5.0, 20.4];
    const Z: [f64; 8] = [-10.0, -1.01, -0.99, 0.0, 0.6, 0.95, 1.5, 10.0];

    let mut points = Vec::with_capacity(A.len() * B.len() * C.len() * Z.len());
    for a in A {
        for b in B {
            for c in C {
                for z in Z {
                    points.push(vec![a, b, c, z]);
                }
            }
        }
    }
    points
}

fn lomax(rng: &mut ChaCha8Rng) -> f64 {
    let u: f64 = rng.r#gen();
    (1.0 - u).powf(-1.0 / PARETO_SHAPE) - 1.0
}

fn signed_lomax(rng: &mut ChaCha8Rng) -> f64 {
    let magnitude = lomax(rng);
    if rng.gen_bool(0.5) { -magnitude } else { magnitude }
}

/// `n` random `(a, b, c, z)` with heavy-tailed signed parameters and `z`
/// uniform in `[-1, 1)`. The same seed always gives the same points.
///
/// For references older than 0.14, `c` is raised to `max(|a|, |b|)` when it
/// is smaller in magnitude.
#[must_use]
pub fn hyp2f1_random_points(seed: u64, n: usize, reference: &Version) -> Vec<Vec<f64>> {
    let clamp_c = Version::parse(SMALL_C_FIX).is_ok_and(|fix| !reference.at_least(&fix));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n)
        .map(|_| {
            let a = signed_lomax(&mut rng);
            let b = signed_lomax(&mut rng);
            let mut c = signed_lomax(&mut rng);
            let z = rng.gen_range(-1.0..1.0);

            let largest = a.abs().max(b.abs());
            if clamp_c && largest > c.abs() {
                c = largest;
            }
            vec![a, b, c, z]
        })
        .collect()
}
