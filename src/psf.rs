//! Huygens point spread function
//!
//! The PSF is the coherent sum of the wavelets carried by the rays of a traced bundle:
//! `I(p) = |Σ_r A(r, p)|²` with `A` an [AmplitudeKernel].
//! Vignetted rays are discarded first, the time of the first remaining ray is the
//! reference time of every wavelet.

use std::time::Instant;

use nalgebra::{Complex, DMatrix};
use rayon::prelude::*;

use crate::{optic::Optic, surface::SurfaceError, RayBundle};

mod grid;
mod kernel;
pub use grid::{meshgrid, SampleGrid};
pub use kernel::{AmplitudeKernel, Kernel, PlaneWave, SphericalWavelet};

#[derive(Debug, thiserror::Error)]
pub enum PsfError {
    #[error("sample grid coordinates have different shapes: x{x:?}, y{y:?}, z{z:?}")]
    ShapeMismatch {
        x: (usize, usize),
        y: (usize, usize),
        z: (usize, usize),
    },
    #[error("no ray left after trimming vignetted rays")]
    EmptyBundle,
    #[error("no rays were given and the optic has no pupil rays")]
    MissingRays,
    #[error("ray tracing failed")]
    Trace(#[from] SurfaceError),
}
type Result<T> = std::result::Result<T, PsfError>;

/// Huygens PSF accumulator
#[derive(Debug, Clone)]
pub struct Huygens<K = PlaneWave> {
    rays: RayBundle,
    t0: f64,
    kernel: K,
}
impl Huygens {
    /// Accumulator over the rays of the bundle that are not vignetted
    pub fn new(rays: &RayBundle) -> Result<Self> {
        let rays = rays.trim_vignetted();
        let t0 = rays.first().ok_or(PsfError::EmptyBundle)?.time();
        log::debug!("Huygens PSF with {} rays, reference time: {t0}", rays.len());
        Ok(Self {
            rays,
            t0,
            kernel: PlaneWave,
        })
    }
}
impl<K: AmplitudeKernel> Huygens<K> {
    /// Sets the wavelet amplitude kernel
    pub fn kernel<T: AmplitudeKernel>(self, kernel: T) -> Huygens<T> {
        Huygens {
            rays: self.rays,
            t0: self.t0,
            kernel,
        }
    }
    /// Number of rays contributing to the PSF
    pub fn n_ray(&self) -> usize {
        self.rays.len()
    }
    pub fn reference_time(&self) -> f64 {
        self.t0
    }
    /// Complex amplitude at every sample of the grid
    pub fn amplitude(&self, grid: &SampleGrid) -> DMatrix<Complex<f64>> {
        let (nrows, ncols) = grid.shape();
        let amplitudes: Vec<Complex<f64>> = (0..grid.len())
            .into_par_iter()
            .map(|k| {
                let point = grid.point(k);
                self.rays
                    .iter()
                    .map(|ray| self.kernel.amplitude(ray, self.t0, &point))
                    .sum()
            })
            .collect();
        DMatrix::from_vec(nrows, ncols, amplitudes)
    }
    /// Intensity at every sample of the grid
    pub fn psf(&self, grid: &SampleGrid) -> DMatrix<f64> {
        let now = Instant::now();
        let intensity = self.amplitude(grid).map(|a| a.norm_sqr());
        log::info!(
            "{}x{} PSF from {} rays computed in {}ms",
            intensity.nrows(),
            intensity.ncols(),
            self.n_ray(),
            now.elapsed().as_millis()
        );
        intensity
    }
}

/// Huygens PSF of an optic sampled at `(x, y, z)`
///
/// The rays are traced through the optic, if `rays` is `None` the optic pupil rays are
/// used. `z` defaults to 0. The grid is expressed in the frame of the traced rays.
pub fn huygens_psf<O: Optic + ?Sized>(
    optic: &O,
    x: &DMatrix<f64>,
    y: &DMatrix<f64>,
    z: Option<&DMatrix<f64>>,
    rays: Option<&RayBundle>,
) -> Result<DMatrix<f64>> {
    let grid = SampleGrid::new(x.clone(), y.clone(), z.cloned())?;
    let traced = match rays {
        Some(rays) => optic.trace(rays)?,
        None => optic.trace(&optic.pupil_rays().ok_or(PsfError::MissingRays)?)?,
    };
    Ok(Huygens::new(&traced.rays)?.psf(&grid))
}
