//! Rays
//!
//! A ray moves linearly in time: `position_at_time(t) = position + direction·(t - time)`.
//! The direction is a velocity in units of the speed of light, its magnitude is `1/n` in
//! a medium of refractive index `n`, and times are expressed in length units.

use std::{f64::consts::PI, fmt};

use nalgebra::Vector3;

mod bundle;
pub use bundle::RayBundle;

/// Ray state at a given time
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub(crate) position: Vector3<f64>,
    pub(crate) direction: Vector3<f64>,
    pub(crate) time: f64,
    pub(crate) wavelength: f64,
    pub(crate) vignetted: bool,
    pub(crate) failed: bool,
}
impl Ray {
    /// Creates a new unvignetted [Ray]
    pub fn new(
        position: impl Into<Vector3<f64>>,
        direction: impl Into<Vector3<f64>>,
        time: f64,
        wavelength: f64,
    ) -> Self {
        Self {
            position: position.into(),
            direction: direction.into(),
            time,
            wavelength,
            vignetted: false,
            failed: false,
        }
    }
    /// Sets the vignetting flag
    pub fn vignetted(mut self, vignetted: bool) -> Self {
        self.vignetted = vignetted;
        self
    }
    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }
    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }
    pub fn time(&self) -> f64 {
        self.time
    }
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }
    pub fn is_vignetted(&self) -> bool {
        self.vignetted
    }
    /// Returns true if a previous interaction could not be computed
    pub fn is_failed(&self) -> bool {
        self.failed
    }
    /// Ray position at time `t`
    pub fn position_at_time(&self, t: f64) -> Vector3<f64> {
        self.position + self.direction * (t - self.time)
    }
    /// New ray moved along its trajectory to time `t`
    pub fn propagated_to_time(&self, t: f64) -> Self {
        Self {
            position: self.position_at_time(t),
            time: t,
            ..self.clone()
        }
    }
    /// Refractive index of the medium the ray travels in
    pub fn refractive_index(&self) -> f64 {
        self.direction.norm().recip()
    }
    /// Wave vector `2π/λ·v/|v|²`
    pub fn k(&self) -> Vector3<f64> {
        self.direction * (2f64 * PI / self.wavelength / self.direction.norm_squared())
    }
    /// Angular frequency `2π/λ`
    pub fn omega(&self) -> f64 {
        2f64 * PI / self.wavelength
    }
    /// Copy of the ray flagged as failed, hence vignetted
    pub(crate) fn failure(&self) -> Self {
        Self {
            vignetted: true,
            failed: true,
            ..self.clone()
        }
    }
}
impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p, v) = (&self.position, &self.direction);
        write!(
            f,
            "Ray([{:.6},{:.6},{:.6}], [{:.6},{:.6},{:.6}], t={:.6}, λ={:e}{}{})",
            p.x,
            p.y,
            p.z,
            v.x,
            v.y,
            v.z,
            self.time,
            self.wavelength,
            if self.vignetted { ", vignetted" } else { "" },
            if self.failed { ", failed" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_motion() {
        let ray = Ray::new([1., 2., -10.], [0., 0.5, 1.], 3., 500e-9);
        assert_eq!(ray.position_at_time(3.), Vector3::new(1., 2., -10.));
        assert_eq!(ray.position_at_time(5.), Vector3::new(1., 3., -8.));
        let moved = ray.propagated_to_time(7.);
        assert_eq!(moved.time(), 7.);
        assert_eq!(moved.position_at_time(3.), *ray.position());
        assert_eq!(moved.wavelength(), ray.wavelength());
    }

    #[test]
    fn wave_vector() {
        // glass of index 1.5
        let ray = Ray::new([0., 0., 0.], [0., 0., 1. / 1.5], 0., 1e-6);
        assert!((ray.refractive_index() - 1.5).abs() < 1e-15);
        assert!((ray.k().norm() - 1.5 * ray.omega()).abs() < 1e-6);
    }

    #[test]
    fn failure_is_vignetted() {
        let ray = Ray::new([0., 0., 0.], [0., 0., 1.], 0., 1e-6);
        assert!(!ray.is_vignetted());
        let failed = ray.failure();
        assert!(failed.is_vignetted() && failed.is_failed());
        assert_eq!(failed.position(), ray.position());
    }
}
