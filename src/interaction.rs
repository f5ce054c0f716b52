//! Reflection and refraction of a ray at a surface
//!
//! The ray is expected at the intersection point, the normal is the unit surface normal at
//! that point, either orientation.
//! Failed rays are given back unchanged.

use nalgebra::Vector3;

use crate::{surface::SurfaceError, Ray};

/// Refractive index of a homogeneous medium as a function of the wavelength
pub trait Medium: Sync {
    fn n(&self, wavelength: f64) -> f64;
}
/// Non-dispersive medium
impl Medium for f64 {
    fn n(&self, _wavelength: f64) -> f64 {
        *self
    }
}
/// Cauchy dispersion law: `n(λ) = a + b/λ²`
///
/// `b` is given in the squared unit of the ray wavelengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cauchy {
    pub a: f64,
    pub b: f64,
}
impl Cauchy {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}
impl Medium for Cauchy {
    fn n(&self, wavelength: f64) -> f64 {
        self.a + self.b / (wavelength * wavelength)
    }
}

/// Mirrors the ray direction about the surface normal, the speed is preserved
pub fn reflect(ray: &Ray, normal: &Vector3<f64>) -> Ray {
    if ray.failed {
        return ray.clone();
    }
    let v = &ray.direction;
    Ray {
        direction: v - normal * (2f64 * v.dot(normal)),
        ..ray.clone()
    }
}

/// Refracts the ray from a medium of index `n1` into a medium of index `n2`
///
/// The outgoing direction is `d + k·n` rescaled to the speed `1/n2`, with `d` the unit
/// incoming direction and `k` the root of `k² + 2(d·n)k + 1 - n2²/n1² = 0` that keeps the
/// ray on the same side of the surface.
pub fn refract(ray: &Ray, normal: &Vector3<f64>, n1: f64, n2: f64) -> Result<Ray, SurfaceError> {
    if ray.failed {
        return Ok(ray.clone());
    }
    let d = ray.direction.normalize();
    let alpha = d.dot(normal);
    let discriminant = alpha * alpha - 1f64 + (n2 * n2) / (n1 * n1);
    if discriminant < 0f64 {
        return Err(SurfaceError::TotalInternalReflection);
    }
    let k = -alpha + alpha.signum() * discriminant.sqrt();
    Ok(Ray {
        direction: (d + normal * k).normalize() / n2,
        ..ray.clone()
    })
}
