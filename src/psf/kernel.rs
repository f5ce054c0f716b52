//! Huygens wavelet amplitudes
//!
//! A kernel gives the complex amplitude a ray contributes at an observation point.
//! The reference time `t0` is shared by all the rays, it only adds a common phase to the
//! wavelets at a given point.

use std::f64::consts::PI;

use nalgebra::{Complex, Vector3};
use strum_macros::{Display, EnumString};

use crate::Ray;

pub trait AmplitudeKernel: Sync {
    /// Complex amplitude of `ray` at `point` relative to the time `t0`
    fn amplitude(&self, ray: &Ray, t0: f64, point: &Vector3<f64>) -> Complex<f64>;
}

/// Plane wave locally tangent to the ray wavefront
///
/// `φ = k·(p - r) - ω(t0 - t)` with unit magnitude
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneWave;
impl AmplitudeKernel for PlaneWave {
    fn amplitude(&self, ray: &Ray, t0: f64, point: &Vector3<f64>) -> Complex<f64> {
        let phase = ray.k().dot(&(point - ray.position)) - ray.omega() * (t0 - ray.time);
        Complex::new(phase.cos(), phase.sin())
    }
}

/// Spherical wavelet emitted at the ray position
///
/// `φ = (2π/λ)·n·|p - r| - ω(t0 - t)` with unit magnitude
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalWavelet;
impl AmplitudeKernel for SphericalWavelet {
    fn amplitude(&self, ray: &Ray, t0: f64, point: &Vector3<f64>) -> Complex<f64> {
        let opl = ray.refractive_index() * (point - ray.position).norm();
        let phase = 2f64 * PI * opl / ray.wavelength - ray.omega() * (t0 - ray.time);
        Complex::new(phase.cos(), phase.sin())
    }
}

/// Kernel selection
#[derive(Debug, Clone, Copy, Default, PartialEq, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Kernel {
    #[default]
    PlaneWave,
    SphericalWavelet,
}
impl AmplitudeKernel for Kernel {
    fn amplitude(&self, ray: &Ray, t0: f64, point: &Vector3<f64>) -> Complex<f64> {
        match self {
            Kernel::PlaneWave => PlaneWave.amplitude(ray, t0, point),
            Kernel::SphericalWavelet => SphericalWavelet.amplitude(ray, t0, point),
        }
    }
}
