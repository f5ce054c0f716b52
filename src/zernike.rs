//! Zernike polynomial surfaces
//!
//! The sag is the expansion `sag(x,y) = Σ_j coefs[j]·Z_j(x/R_outer, y/R_outer)` with `Z_j`
//! the Noll-ordered Zernike polynomials, annular if `R_inner > 0`.
//! The expansion is converted once into a Cartesian power series `Σ C[(i,j)]·x^i·y^j`
//! evaluated with [horner2d].
//!
//! The annulus `[R_inner, R_outer]` is the domain where the expansion is orthonormal;
//! [Zernike::sag] extrapolates the polynomial outside of it and only intersections
//! flag rays falling outside of the annulus as vignetted.

use std::{sync::OnceLock, time::Instant};

use nalgebra::DMatrix;

use crate::{
    newton::Intersector,
    polynomial::{horner2d, horner2d_grid, mul2d, ncr, PolynomialError},
    surface::{self, vignette_annulus, Surface},
    Ray,
};

pub mod noll;
pub mod radial;
use noll::{max_degree, noll_to_zern};
use radial::annular_zern_rho_coefs;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ZernikeError {
    /// Radii outside of `0 ≤ r_inner < r_outer` with a finite `r_outer > 0`
    ///
    /// Equal radii are rejected too: a zero-area annulus has no Zernike basis.
    #[error("invalid annulus radii: outer {r_outer}, inner {r_inner}")]
    InvalidRadius { r_outer: f64, r_inner: f64 },
    #[error("Cartesian conversion failed")]
    Polynomial(#[from] PolynomialError),
}
type Result<T> = std::result::Result<T, ZernikeError>;

/// Zernike surface
///
/// The surface is immutable once built. The partial derivatives [Zernike::grad_x] and
/// [Zernike::grad_y] are themselves [Zernike] surfaces, computed on first access and
/// cached for the lifetime of the surface.
#[derive(Debug, Clone)]
pub struct Zernike {
    coefs: Option<Vec<f64>>,
    r_outer: f64,
    r_inner: f64,
    xy: DMatrix<f64>,
    intersector: Intersector,
    grad_x: OnceLock<Box<Zernike>>,
    grad_y: OnceLock<Box<Zernike>>,
}
impl Zernike {
    /// Creates a new Zernike surface
    ///
    /// `coefs[j]` is the coefficient of the Noll indexed polynomial `Z_j`, `coefs[0]` is
    /// ignored. `r_outer` and `r_inner` bound the annulus, `0 ≤ r_inner < r_outer`.
    pub fn new(coefs: Vec<f64>, r_outer: f64, r_inner: f64) -> Result<Self> {
        if !(r_outer.is_finite() && r_inner.is_finite() && r_inner >= 0f64 && r_inner < r_outer)
        {
            return Err(ZernikeError::InvalidRadius { r_outer, r_inner });
        }
        let now = Instant::now();
        let xy = cartesian_coefs(&coefs, r_outer, r_inner)?;
        log::debug!(
            "Zernike surface ({} coefficients, {}x{} Cartesian matrix) built in {}μs",
            coefs.len(),
            xy.nrows(),
            xy.ncols(),
            now.elapsed().as_micros()
        );
        Ok(Self {
            coefs: Some(coefs),
            r_outer,
            r_inner,
            xy,
            intersector: Default::default(),
            grad_x: OnceLock::new(),
            grad_y: OnceLock::new(),
        })
    }
    /// Sets the Newton intersector, derived gradient surfaces inherit it
    pub fn intersector(self, intersector: Intersector) -> Self {
        Self {
            intersector,
            grad_x: OnceLock::new(),
            grad_y: OnceLock::new(),
            ..self
        }
    }
    /// Zernike coefficients, `None` for the derived gradient surfaces
    pub fn coefs(&self) -> Option<&[f64]> {
        self.coefs.as_deref()
    }
    pub fn r_outer(&self) -> f64 {
        self.r_outer
    }
    pub fn r_inner(&self) -> f64 {
        self.r_inner
    }
    /// Cartesian coefficients: `C[(i,j)]` multiplies `x^i·y^j`
    pub fn xy_coefs(&self) -> &DMatrix<f64> {
        &self.xy
    }
    /// Sag evaluated elementwise over matrices of coordinates
    pub fn sag_grid(&self, x: &DMatrix<f64>, y: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Ok(horner2d_grid(x, y, &self.xy)?)
    }
    /// Surface of `∂sag/∂x`
    pub fn grad_x(&self) -> &Zernike {
        self.grad_x.get_or_init(|| {
            let (nrows, ncols) = self.xy.shape();
            let xy = DMatrix::from_fn(nrows, ncols, |i, j| {
                if i + 1 < nrows {
                    (i + 1) as f64 * self.xy[(i + 1, j)]
                } else {
                    0f64
                }
            });
            Box::new(self.derived(xy))
        })
    }
    /// Surface of `∂sag/∂y`
    pub fn grad_y(&self) -> &Zernike {
        self.grad_y.get_or_init(|| {
            let (nrows, ncols) = self.xy.shape();
            let xy = DMatrix::from_fn(nrows, ncols, |i, j| {
                if j + 1 < ncols {
                    (j + 1) as f64 * self.xy[(i, j + 1)]
                } else {
                    0f64
                }
            });
            Box::new(self.derived(xy))
        })
    }
    fn derived(&self, xy: DMatrix<f64>) -> Self {
        Self {
            coefs: None,
            r_outer: self.r_outer,
            r_inner: self.r_inner,
            xy,
            intersector: self.intersector,
            grad_x: OnceLock::new(),
            grad_y: OnceLock::new(),
        }
    }
}
impl Surface for Zernike {
    fn sag(&self, x: f64, y: f64) -> f64 {
        horner2d(x, y, &self.xy)
    }
    fn gradient(&self, x: f64, y: f64) -> (f64, f64) {
        (self.grad_x().sag(x, y), self.grad_y().sag(x, y))
    }
    /// Newton intersection, rays hitting the surface outside of the annulus are vignetted
    fn intersect(&self, ray: &Ray) -> surface::Result<Ray> {
        self.intersector
            .solve(self, ray)
            .map(|ray| vignette_annulus(ray, self.r_inner, self.r_outer))
    }
}

/// Cartesian matrix of the Zernike expansion in physical units
fn cartesian_coefs(coefs: &[f64], r_outer: f64, r_inner: f64) -> Result<DMatrix<f64>> {
    let degree = max_degree(coefs.len().saturating_sub(1));
    let eps = r_inner / r_outer;
    let mut xy = DMatrix::<f64>::zeros(degree + 1, degree + 1);
    for (j, &c) in coefs.iter().enumerate().skip(1) {
        if c == 0f64 {
            continue;
        }
        let (n, m) = noll_to_zern(j);
        let m_abs = m.unsigned_abs() as usize;
        let norm = if m == 0 {
            ((n + 1) as f64).sqrt()
        } else {
            (2f64 * (n + 1) as f64).sqrt()
        };
        let angular = angular_coefs(m_abs, m < 0)?;
        for (k, r) in annular_zern_rho_coefs(n, m_abs, eps)?
            .into_iter()
            .enumerate()
            .skip(m_abs)
        {
            if r == 0f64 {
                continue;
            }
            // ρ^k·cos(mθ) = ρ^(k-m)·Re((x+iy)^m)
            let term = mul2d(&rho2_coefs((k - m_abs) / 2)?, &angular);
            for a in 0..term.nrows() {
                for b in 0..term.ncols() {
                    xy[(a, b)] += c * norm * r * term[(a, b)];
                }
            }
        }
    }
    for a in 0..=degree {
        for b in 0..=degree - a {
            xy[(a, b)] /= r_outer.powi((a + b) as i32);
        }
    }
    Ok(xy)
}

/// Cartesian matrix of `(x²+y²)^p`
fn rho2_coefs(p: usize) -> Result<DMatrix<f64>> {
    let mut c = DMatrix::<f64>::zeros(2 * p + 1, 2 * p + 1);
    for l in 0..=p {
        c[(2 * l, 2 * (p - l))] = ncr(p as u64, l as u64)? as f64;
    }
    Ok(c)
}

/// Cartesian matrix of `Re((x+iy)^m)`, or `Im((x+iy)^m)` if `sine`
fn angular_coefs(m: usize, sine: bool) -> Result<DMatrix<f64>> {
    let mut c = DMatrix::<f64>::zeros(m + 1, m + 1);
    // (x+iy)^m = Σ_l nCr(m,l)·x^(m-l)·i^l·y^l
    for l in (usize::from(sine)..=m).step_by(2) {
        let sign = if (l / 2) % 2 == 0 { 1f64 } else { -1f64 };
        c[(m - l, l)] = sign * ncr(m as u64, l as u64)? as f64;
    }
    Ok(c)
}
