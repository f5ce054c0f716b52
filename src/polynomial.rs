//! Polynomial primitives
//!
//! Binomial coefficients, binomial expansions and Horner evaluation of 1-D and 2-D
//! power series. The 2-D coefficient matrices follow the convention `C[(i, j)]` is the
//! coefficient of `x^i·y^j`.

use nalgebra::DMatrix;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PolynomialError {
    #[error("nCr({n}, {r}) does not fit in a 64 bits unsigned integer")]
    Overflow { n: u64, r: u64 },
    #[error("x{x:?} and y{y:?} samples have different shapes")]
    ShapeMismatch {
        x: (usize, usize),
        y: (usize, usize),
    },
}
type Result<T> = std::result::Result<T, PolynomialError>;

/// Binomial coefficient `n! / (r! (n-r)!)`
///
/// The product is accumulated with the multiplicative formula, dividing at each step so
/// that every partial result is itself a binomial coefficient.
/// Every coefficient with `n < 68` is exact; a coefficient that does not fit in a `u64`
/// returns [PolynomialError::Overflow].
/// `r > n` gives 0.
pub fn ncr(n: u64, r: u64) -> Result<u64> {
    if r > n {
        return Ok(0);
    }
    let r_min = r.min(n - r);
    let mut c = 1u128;
    for k in 0..r_min {
        // c = C(n, k) here, so c·(n-k) is divisible by k+1
        c = c * (n - k) as u128 / (k + 1) as u128;
        if c > u64::MAX as u128 {
            return Err(PolynomialError::Overflow { n, r });
        }
    }
    Ok(c as u64)
}

/// Terms of the expansion of `(a+b)^n`
///
/// Returns the `n+1` terms `nCr(n,k)·a^(n-k)·b^k` for k in `0..=n`, i.e. ordered by
/// descending powers of `a`.
/// The binomial weights are computed in floating point so `n` is not limited by [ncr].
pub fn binomial_coefs(a: f64, b: f64, n: u32) -> Vec<f64> {
    let mut weight = 1f64;
    (0..=n)
        .map(|k| {
            let term = weight * a.powi((n - k) as i32) * b.powi(k as i32);
            weight = weight * (n - k) as f64 / (k + 1) as f64;
            term
        })
        .collect()
}

/// `(a+b)^n` evaluated as the sum of the binomial expansion terms in ascending powers of `b`
pub fn binomial(a: f64, b: f64, n: u32) -> f64 {
    binomial_coefs(a, b, n).into_iter().sum()
}

/// Horner evaluation of `Σ_k coefs[k]·x^k`
pub fn horner(x: f64, coefs: &[f64]) -> f64 {
    coefs.iter().rev().fold(0f64, |acc, &c| acc * x + c)
}

/// Horner evaluation of the bivariate polynomial `Σ_i Σ_j C[(i,j)]·x^i·y^j`
///
/// Each row is first collapsed over `y`, the resulting univariate polynomial in `x` is
/// then evaluated, again with Horner's scheme.
pub fn horner2d(x: f64, y: f64, coefs: &DMatrix<f64>) -> f64 {
    (0..coefs.nrows()).rev().fold(0f64, |acc, i| {
        let row_value = (0..coefs.ncols())
            .rev()
            .fold(0f64, |r, j| r * y + coefs[(i, j)]);
        acc * x + row_value
    })
}

/// Elementwise [horner2d] over matrices of sample coordinates
///
/// `x` and `y` must have the same shape, the result has that shape too.
pub fn horner2d_grid(
    x: &DMatrix<f64>,
    y: &DMatrix<f64>,
    coefs: &DMatrix<f64>,
) -> Result<DMatrix<f64>> {
    if x.shape() != y.shape() {
        return Err(PolynomialError::ShapeMismatch {
            x: x.shape(),
            y: y.shape(),
        });
    }
    Ok(x.zip_map(y, |x, y| horner2d(x, y, coefs)))
}

/// Real roots `(r1, r2)`, `r1 ≤ r2`, of `a·x² + b·x + c = 0`
///
/// A vanishing `a` degenerates into the linear equation, its root is returned twice.
/// Returns `None` when there is no real root.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0f64 {
        let r = -c / b;
        return r.is_finite().then_some((r, r));
    }
    let discriminant = b * b - 4f64 * a * c;
    if discriminant < 0f64 {
        return None;
    }
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    if q == 0f64 {
        return Some((0f64, 0f64));
    }
    let (r1, r2) = (q / a, c / q);
    Some(if r1 <= r2 { (r1, r2) } else { (r2, r1) })
}

/// Product of two bivariate polynomials given as coefficient matrices
pub(crate) fn mul2d(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
    let mut c = DMatrix::<f64>::zeros(a.nrows() + b.nrows() - 1, a.ncols() + b.ncols() - 1);
    for ia in 0..a.nrows() {
        for ja in 0..a.ncols() {
            let va = a[(ia, ja)];
            if va == 0f64 {
                continue;
            }
            for ib in 0..b.nrows() {
                for jb in 0..b.ncols() {
                    c[(ia + ib, ja + jb)] += va * b[(ib, jb)];
                }
            }
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn pascal(n_max: usize) -> Vec<Vec<u128>> {
        let mut rows: Vec<Vec<u128>> = vec![vec![1]];
        for n in 1..=n_max {
            let prev = &rows[n - 1];
            let row = (0..=n)
                .map(|r| match r {
                    0 => 1,
                    r if r == n => 1,
                    r => prev[r - 1] + prev[r],
                })
                .collect();
            rows.push(row);
        }
        rows
    }

    #[test]
    fn ncr_exact_below_68() {
        let triangle = pascal(67);
        for n in 0..68u64 {
            for r in 0..=n {
                assert_eq!(
                    ncr(n, r).unwrap() as u128,
                    triangle[n as usize][r as usize],
                    "nCr({n},{r})"
                );
            }
        }
    }

    #[test]
    fn ncr_overflow() {
        assert_eq!(
            ncr(68, 34),
            Err(PolynomialError::Overflow { n: 68, r: 34 })
        );
        assert!(ncr(100, 50).is_err());
        // small r stays representable
        assert_eq!(ncr(100, 2).unwrap(), 4950);
        assert_eq!(ncr(5, 7).unwrap(), 0);
    }

    #[test]
    fn binomial_expansion() {
        let mut rng = StdRng::seed_from_u64(57);
        for _ in 0..1000 {
            let a: f64 = rng.gen_range(0.0..2.0);
            let b: f64 = rng.gen_range(0.0..2.0);
            let n: u32 = rng.gen_range(0..100);
            let value = binomial(a, b, n);
            let expected = (a + b).powi(n as i32);
            assert!(
                (value - expected).abs() <= 1e-12 * expected.abs().max(f64::MIN_POSITIVE),
                "({a}+{b})^{n}: {value} vs {expected}"
            );
        }
    }

    #[test]
    fn signed_binomial_expansion() {
        let mut rng = StdRng::seed_from_u64(5757);
        for _ in 0..1000 {
            let a: f64 = rng.gen_range(-2.0..2.0);
            let b: f64 = rng.gen_range(-2.0..2.0);
            let n: u32 = rng.gen_range(0..60);
            let value = binomial(a, b, n);
            // exact integer weights, ascending powers of b
            let reference: f64 = (0..=n)
                .map(|k| {
                    ncr(n as u64, k as u64).unwrap() as f64
                        * b.powi(k as i32)
                        * a.powi((n - k) as i32)
                })
                .sum();
            // cancellation is bounded by the sum of the term magnitudes
            let scale = (a.abs() + b.abs()).powi(n as i32).max(f64::MIN_POSITIVE);
            let tol = 1e-14 * (n + 1) as f64 * scale;
            assert!(
                (value - reference).abs() <= tol,
                "({a}+{b})^{n}: {value} vs {reference}"
            );
            assert!(
                (value - (a + b).powi(n as i32)).abs() <= tol,
                "({a}+{b})^{n}: {value} vs {}",
                (a + b).powi(n as i32)
            );
        }
    }

    #[test]
    fn binomial_terms() {
        let terms = binomial_coefs(2., 3., 3);
        assert_eq!(terms, vec![8., 36., 54., 27.]);
        assert_eq!(binomial_coefs(1.5, -0.5, 0), vec![1.]);
    }

    #[test]
    fn horner_1d() {
        // 1 - 2x + 3x²
        assert_eq!(horner(2., &[1., -2., 3.]), 9.);
        assert_eq!(horner(2., &[]), 0.);
    }

    #[test]
    fn horner2d_matches_double_sum() {
        let mut rng = StdRng::seed_from_u64(577);
        for _ in 0..1000 {
            let nx = rng.gen_range(1..20);
            let ny = rng.gen_range(1..20);
            let coefs = DMatrix::<f64>::from_fn(nx, ny, |_, _| rng.gen_range(-1.0..1.0));
            let x: f64 = rng.gen_range(-1.5..1.5);
            let y: f64 = rng.gen_range(-1.5..1.5);
            let mut sum = 0f64;
            let mut scale = 0f64;
            for i in 0..nx {
                for j in 0..ny {
                    let term = coefs[(i, j)] * x.powi(i as i32) * y.powi(j as i32);
                    sum += term;
                    scale += term.abs();
                }
            }
            let value = horner2d(x, y, &coefs);
            assert!(
                (value - sum).abs() <= 1e-13 * scale.max(1e-300),
                "{value} vs {sum}"
            );
        }
    }

    #[test]
    fn horner2d_grid_elementwise() {
        let coefs = DMatrix::from_row_slice(2, 3, &[1., 2., 3., 4., 5., 6.]);
        let x = DMatrix::from_row_slice(2, 2, &[0., 1., -1., 0.5]);
        let y = DMatrix::from_row_slice(2, 2, &[0.25, -2., 1., 0.]);
        let z = horner2d_grid(&x, &y, &coefs).unwrap();
        assert_eq!(z.shape(), (2, 2));
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(z[(i, j)], horner2d(x[(i, j)], y[(i, j)], &coefs));
            }
        }
    }

    #[test]
    fn horner2d_grid_shape_mismatch() {
        let coefs = DMatrix::from_element(1, 1, 1f64);
        let x = DMatrix::<f64>::zeros(2, 3);
        let y = DMatrix::<f64>::zeros(3, 2);
        assert_eq!(
            horner2d_grid(&x, &y, &coefs),
            Err(PolynomialError::ShapeMismatch {
                x: (2, 3),
                y: (3, 2)
            })
        );
    }

    #[test]
    fn quadratic_roots() {
        // (x-1)(x+3)
        assert_eq!(solve_quadratic(1., 2., -3.), Some((-3., 1.)));
        // 2x - 4
        assert_eq!(solve_quadratic(0., 2., -4.), Some((2., 2.)));
        assert_eq!(solve_quadratic(1., 0., 1.), None);
        assert_eq!(solve_quadratic(0., 0., 1.), None);
        // no catastrophic cancellation on the small root
        let (r1, r2) = solve_quadratic(1., -1e8, 1.).unwrap();
        assert!((r1 - 1e-8).abs() < 1e-20);
        assert!((r2 - 1e8).abs() < 1e-6);
    }

    #[test]
    fn product_of_polynomials() {
        // (1 + x)(1 + y) = 1 + x + y + xy
        let a = DMatrix::from_row_slice(2, 1, &[1., 1.]);
        let b = DMatrix::from_row_slice(1, 2, &[1., 1.]);
        let c = mul2d(&a, &b);
        assert_eq!(c, DMatrix::from_row_slice(2, 2, &[1., 1., 1., 1.]));
    }
}
