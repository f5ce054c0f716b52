//! Optical surfaces
//!
//! A surface is described by its sag `z = sag(x, y)` in its local coordinate system.
//! Intersecting a [Ray] with a surface returns a new ray located at the intersection
//! point, at the time the intersection happens.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::{Ray, RayBundle};

mod plane;
mod quadric;
pub use plane::Plane;
pub use quadric::Quadric;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SurfaceError {
    #[error("intersection did not converge after {iterations} iterations (residual: {residual:e})")]
    NonConvergence { iterations: usize, residual: f64 },
    #[error("intersection stalled at iteration #{iteration} on a vanishing derivative")]
    Stalled { iteration: usize },
    #[error("the ray does not intersect the surface")]
    NoIntersection,
    #[error("the ray previous interaction failed")]
    PreviouslyFailed,
    #[error("total internal reflection")]
    TotalInternalReflection,
}
pub(crate) type Result<T> = std::result::Result<T, SurfaceError>;

pub trait Surface: Sync {
    /// Surface height at (x,y)
    fn sag(&self, x: f64, y: f64) -> f64;
    /// Partial derivatives of the sag: (∂sag/∂x, ∂sag/∂y)
    fn gradient(&self, x: f64, y: f64) -> (f64, f64);
    /// Unit surface normal at (x,y), pointing toward `+z`
    fn normal(&self, x: f64, y: f64) -> Vector3<f64> {
        let (dzdx, dzdy) = self.gradient(x, y);
        Vector3::new(-dzdx, -dzdy, 1f64).normalize()
    }
    /// Intersects the ray with the surface
    fn intersect(&self, ray: &Ray) -> Result<Ray>;
    /// Intersects the ray with the surface, a failure gives back the input ray flagged as
    /// failed and vignetted
    fn intersect_or_vignette(&self, ray: &Ray) -> Ray {
        match self.intersect(ray) {
            Ok(ray) => ray,
            Err(SurfaceError::PreviouslyFailed) => ray.clone(),
            Err(e) => {
                log::debug!("{ray}: {e}");
                ray.failure()
            }
        }
    }
    /// Intersects all the rays of the bundle with the surface
    ///
    /// Each ray is processed independently with [Surface::intersect_or_vignette].
    fn intersect_bundle(&self, rays: &RayBundle) -> RayBundle {
        rays.par_iter()
            .map(|ray| self.intersect_or_vignette(ray))
            .collect()
    }
}

/// Flags the ray as vignetted if `(x,y)` lies outside the `[r_inner, r_outer]` annulus
pub(crate) fn vignette_annulus(mut ray: Ray, r_inner: f64, r_outer: f64) -> Ray {
    let rho = ray.position.x.hypot(ray.position.y);
    if rho < r_inner || rho > r_outer {
        ray.vignetted = true;
    }
    ray
}
