use super::{Result, Surface, SurfaceError};
use crate::Ray;

/// The `z = 0` plane, optionally limited to an annulus
#[derive(Debug, Clone, Default)]
pub struct Plane {
    aperture: Option<(f64, f64)>,
}
impl Plane {
    pub fn new() -> Self {
        Default::default()
    }
    /// Rays intersecting the plane outside the annulus `[r_inner, r_outer]` are vignetted
    pub fn aperture(self, r_inner: f64, r_outer: f64) -> Self {
        Self {
            aperture: Some((r_inner, r_outer)),
        }
    }
    /// Time offset from the ray time to the crossing of the `z = 0` plane
    pub(crate) fn crossing_time(ray: &Ray) -> Option<f64> {
        let dt = -ray.position.z / ray.direction.z;
        dt.is_finite().then_some(dt)
    }
}
impl Surface for Plane {
    fn sag(&self, _x: f64, _y: f64) -> f64 {
        0f64
    }
    fn gradient(&self, _x: f64, _y: f64) -> (f64, f64) {
        (0f64, 0f64)
    }
    fn intersect(&self, ray: &Ray) -> Result<Ray> {
        if ray.failed {
            return Err(SurfaceError::PreviouslyFailed);
        }
        let dt = Self::crossing_time(ray).ok_or(SurfaceError::NoIntersection)?;
        let ray = ray.propagated_to_time(ray.time + dt);
        Ok(match self.aperture {
            Some((r_inner, r_outer)) => super::vignette_annulus(ray, r_inner, r_outer),
            None => ray,
        })
    }
}
