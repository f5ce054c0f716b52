use super::{vignette_annulus, Result, Surface, SurfaceError};
use crate::{polynomial::solve_quadratic, Ray};

/// Conic of revolution
///
/// `sag(r) = r²/(R(1+√(1-(1+κ)r²/R²))) + B` with `R` the radius of curvature at the
/// vertex, `κ` the conic constant and `B` the vertex height.
/// A null radius of curvature is the `z = B` plane.
#[derive(Debug, Clone)]
pub struct Quadric {
    radius: f64,
    conic: f64,
    vertex: f64,
    r_inner: f64,
    r_outer: f64,
}
impl Quadric {
    pub fn new(radius: f64, conic: f64) -> Self {
        Self {
            radius,
            conic,
            vertex: 0f64,
            r_inner: 0f64,
            r_outer: f64::INFINITY,
        }
    }
    /// Paraboloid (`κ = -1`) focusing at `radius/2` above the vertex
    pub fn paraboloid(radius: f64) -> Self {
        Self::new(radius, -1f64)
    }
    pub fn vertex(self, vertex: f64) -> Self {
        Self { vertex, ..self }
    }
    /// Rays intersecting the surface outside the annulus `[r_inner, r_outer]` are vignetted
    pub fn aperture(self, r_inner: f64, r_outer: f64) -> Self {
        Self {
            r_inner,
            r_outer,
            ..self
        }
    }
    pub fn radius(&self) -> f64 {
        self.radius
    }
    pub fn conic(&self) -> f64 {
        self.conic
    }
}
impl Surface for Quadric {
    fn sag(&self, x: f64, y: f64) -> f64 {
        if self.radius == 0f64 {
            return self.vertex;
        }
        let r2 = x * x + y * y;
        let den = self.radius
            * (1f64 + (1f64 - (1f64 + self.conic) * r2 / self.radius / self.radius).sqrt());
        self.vertex + r2 / den
    }
    fn gradient(&self, x: f64, y: f64) -> (f64, f64) {
        if self.radius == 0f64 {
            return (0f64, 0f64);
        }
        let r2 = x * x + y * y;
        let den =
            self.radius * (1f64 - r2 * (1f64 + self.conic) / self.radius / self.radius).sqrt();
        (x / den, y / den)
    }
    fn intersect(&self, ray: &Ray) -> Result<Ray> {
        if ray.failed {
            return Err(SurfaceError::PreviouslyFailed);
        }
        let (p, v) = (&ray.position, &ray.direction);
        let z0 = p.z - self.vertex;
        let roots = if self.radius == 0f64 {
            let dt = -z0 / v.z;
            dt.is_finite().then_some((dt, dt))
        } else {
            // (1+κ)z² - 2Rz + r² = 0 along the ray
            let k1 = 1f64 + self.conic;
            let vr2 = v.x * v.x + v.y * v.y;
            let vrr0 = v.x * p.x + v.y * p.y;
            let r02 = p.x * p.x + p.y * p.y;
            solve_quadratic(
                k1 * v.z * v.z + vr2,
                2f64 * (k1 * z0 * v.z - self.radius * v.z + vrr0),
                k1 * z0 * z0 - 2f64 * self.radius * z0 + r02,
            )
        };
        let (dt1, dt2) = roots.ok_or(SurfaceError::NoIntersection)?;
        // squaring the sag equation adds the other sheet of the conic
        let tolerance = 1e-9 * (1f64 + self.radius.abs());
        let dt = [dt1, dt2]
            .into_iter()
            .filter(|&dt| dt >= 0f64)
            .find(|&dt| {
                let q = ray.position_at_time(ray.time + dt);
                (q.z - self.sag(q.x, q.y)).abs() <= tolerance
            })
            .ok_or(SurfaceError::NoIntersection)?;
        Ok(vignette_annulus(
            ray.propagated_to_time(ray.time + dt),
            self.r_inner,
            self.r_outer,
        ))
    }
}
