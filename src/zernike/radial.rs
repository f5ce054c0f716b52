//! Zernike radial polynomials
//!
//! Coefficients are returned in ascending powers of the normalized radius `ρ`, the vector
//! has `n+1` entries and only the powers `m, m+2, ..., n` are non-zero.
//!
//! For an annulus with obscuration ratio `ε`, the polynomials are normalized such that
//! `∫_ε^1 R_n^m(ρ)² ρ dρ = (1-ε²)/(2(n+1))` with a positive leading coefficient; for
//! `ε = 0` they reduce to the circular polynomials.

use std::f64::consts::PI;

use crate::polynomial::{binomial_coefs, horner, ncr, PolynomialError};

type Result<T> = std::result::Result<T, PolynomialError>;

/// Circular radial polynomial `R_n^m`
pub fn zern_rho_coefs(n: usize, m: usize) -> Result<Vec<f64>> {
    let kmax = (n - m) / 2;
    let mut coefs = vec![0f64; n + 1];
    for k in 0..=kmax {
        let c = ncr((n - k) as u64, k as u64)?
            .checked_mul(ncr((n - 2 * k) as u64, (kmax - k) as u64)?)
            .ok_or(PolynomialError::Overflow {
                n: (n - k) as u64,
                r: k as u64,
            })?;
        coefs[n - 2 * k] = if k % 2 == 0 { c as f64 } else { -(c as f64) };
    }
    Ok(coefs)
}

/// Annular radial polynomial `R_n^m(ρ; ε)`
pub fn annular_zern_rho_coefs(n: usize, m: usize, eps: f64) -> Result<Vec<f64>> {
    if eps == 0f64 {
        return zern_rho_coefs(n, m);
    }
    let e2 = eps * eps;
    if m == 0 {
        // R_n^0((ρ²-ε²)/(1-ε²)) expanded power by power of ρ²
        let norm = 1f64 / (1f64 - e2);
        let mut coefs = vec![0f64; n + 1];
        for (i, c) in zern_rho_coefs(n, 0)?.into_iter().enumerate() {
            if i % 2 == 1 || c == 0f64 {
                continue;
            }
            let p = i / 2;
            for (k, term) in binomial_coefs(norm, -e2 * norm, p as u32)
                .into_iter()
                .enumerate()
            {
                coefs[2 * (p - k)] += c * term;
            }
        }
        return Ok(coefs);
    }
    if m == n {
        let mut coefs = vec![0f64; n + 1];
        coefs[n] = 1f64 / (0..=n).map(|i| e2.powi(i as i32)).sum::<f64>().sqrt();
        return Ok(coefs);
    }
    Ok(orthogonal_rho_coefs(n, m, e2))
}

/// Radial polynomial as `ρ^m·P_j(ρ²)` with `P_j` the monic polynomial of degree
/// `j = (n-m)/2` orthogonal with respect to the weight `t^m` on `[ε², 1]`
///
/// The orthogonal family is built with the Stieltjes three-term recurrence, inner products
/// are evaluated with a Gauss-Legendre quadrature that is exact for the polynomial degrees
/// involved.
fn orthogonal_rho_coefs(n: usize, m: usize, e2: f64) -> Vec<f64> {
    let j = (n - m) / 2;
    let (nodes, weights): (Vec<f64>, Vec<f64>) = gauss_legendre(n + 2)
        .into_iter()
        .map(|(x, w)| {
            let t = 0.5 * (1f64 - e2) * x + 0.5 * (1f64 + e2);
            (t, 0.5 * (1f64 - e2) * w * t.powi(m as i32))
        })
        .unzip();
    let inner = |p: &[f64], q: &[f64], tp: i32| -> f64 {
        nodes
            .iter()
            .zip(&weights)
            .map(|(&t, &w)| w * t.powi(tp) * horner(t, p) * horner(t, q))
            .sum()
    };

    let mut p_prev: Vec<f64> = vec![];
    let mut p = vec![1f64];
    let mut norm_prev = 1f64;
    for k in 0..j {
        let norm = inner(&p, &p, 0);
        let a = inner(&p, &p, 1) / norm;
        let b = if k == 0 { 0f64 } else { norm / norm_prev };
        let mut next = vec![0f64; p.len() + 1];
        for (i, c) in p.iter().enumerate() {
            next[i + 1] += c;
            next[i] -= a * c;
        }
        for (i, c) in p_prev.iter().enumerate() {
            next[i] -= b * c;
        }
        p_prev = p;
        p = next;
        norm_prev = norm;
    }
    let scale = ((1f64 - e2) / ((n + 1) as f64 * inner(&p, &p, 0))).sqrt();

    let mut coefs = vec![0f64; n + 1];
    for (i, c) in p.into_iter().enumerate() {
        coefs[m + 2 * i] = scale * c;
    }
    coefs
}

/// Gauss-Legendre nodes and weights on `[-1, 1]`
pub(crate) fn gauss_legendre(n_node: usize) -> Vec<(f64, f64)> {
    let mut rule = vec![(0f64, 0f64); n_node];
    for i in 0..(n_node + 1) / 2 {
        let mut z = (PI * (i as f64 + 0.75) / (n_node as f64 + 0.5)).cos();
        let mut dp = 0f64;
        for _ in 0..100 {
            let (mut p1, mut p2) = (1f64, 0f64);
            for k in 0..n_node {
                let p3 = p2;
                p2 = p1;
                p1 = ((2 * k + 1) as f64 * z * p2 - k as f64 * p3) / (k + 1) as f64;
            }
            dp = n_node as f64 * (z * p1 - p2) / (z * z - 1f64);
            let dz = p1 / dp;
            z -= dz;
            if dz.abs() < 1e-15 {
                break;
            }
        }
        let w = 2f64 / ((1f64 - z * z) * dp * dp);
        rule[i] = (-z, w);
        rule[n_node - 1 - i] = (z, w);
    }
    rule
}
