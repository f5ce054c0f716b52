//! Optics tracing ray bundles
//!
//! An [Optic] takes a bundle of rays expressed in the global frame and returns the traced
//! bundle together with the coordinate frame the rays are expressed in after tracing.

use nalgebra::{Rotation3, Vector3};
use rayon::prelude::*;

use crate::{
    interaction::{reflect, refract, Medium},
    surface::{Surface, SurfaceError},
    Ray, RayBundle,
};

type Result<T> = std::result::Result<T, SurfaceError>;

/// Coordinate frame: origin and orientation with respect to the global frame
#[derive(Debug, Clone, PartialEq)]
pub struct CoordSys {
    pub origin: Vector3<f64>,
    pub rotation: Rotation3<f64>,
}
impl Default for CoordSys {
    fn default() -> Self {
        Self {
            origin: Vector3::zeros(),
            rotation: Rotation3::identity(),
        }
    }
}
impl CoordSys {
    pub fn new(origin: impl Into<Vector3<f64>>, rotation: Rotation3<f64>) -> Self {
        Self {
            origin: origin.into(),
            rotation,
        }
    }
    /// Ray expressed in this frame from a ray in the global frame
    pub fn to_local(&self, ray: &Ray) -> Ray {
        let r_inv = self.rotation.inverse();
        Ray {
            position: r_inv * (ray.position - self.origin),
            direction: r_inv * ray.direction,
            ..ray.clone()
        }
    }
    /// Ray expressed in the global frame from a ray in this frame
    pub fn to_global(&self, ray: &Ray) -> Ray {
        Ray {
            position: self.rotation * ray.position + self.origin,
            direction: self.rotation * ray.direction,
            ..ray.clone()
        }
    }
}

/// Traced rays and the frame they are expressed in
#[derive(Debug, Clone)]
pub struct Traced {
    pub rays: RayBundle,
    pub frame: CoordSys,
}

pub trait Optic: Sync {
    /// Traces the rays through the optic
    fn trace(&self, rays: &RayBundle) -> Result<Traced>;
    /// Rays filling the entrance pupil, if the optic knows them
    fn pupil_rays(&self) -> Option<RayBundle> {
        None
    }
}

/// Expresses the traced rays in the global frame if `global`, in `frame` otherwise
fn traced(rays: RayBundle, frame: &CoordSys, global: bool) -> Traced {
    if global {
        Traced {
            rays: rays.par_iter().map(|ray| frame.to_global(ray)).collect(),
            frame: CoordSys::default(),
        }
    } else {
        Traced {
            rays,
            frame: frame.clone(),
        }
    }
}

/// Single reflecting surface
pub struct Mirror<S: Surface> {
    surface: S,
    frame: CoordSys,
    pupil: Option<RayBundle>,
    global: bool,
}
impl<S: Surface> Mirror<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            frame: Default::default(),
            pupil: None,
            global: false,
        }
    }
    /// Sets the frame the surface is defined in
    pub fn frame(self, frame: CoordSys) -> Self {
        Self { frame, ..self }
    }
    /// Sets the rays returned by [Optic::pupil_rays]
    pub fn pupil(self, rays: RayBundle) -> Self {
        Self {
            pupil: Some(rays),
            ..self
        }
    }
    /// Returns the traced rays in the global frame instead of the mirror frame
    pub fn global_output(self, global: bool) -> Self {
        Self { global, ..self }
    }
    pub fn surface(&self) -> &S {
        &self.surface
    }
}
impl<S: Surface> Optic for Mirror<S> {
    /// Intersects then reflects the rays, the rays are returned in the mirror frame
    fn trace(&self, rays: &RayBundle) -> Result<Traced> {
        let rays = rays
            .par_iter()
            .map(|ray| {
                let hit = self.surface.intersect_or_vignette(&self.frame.to_local(ray));
                let p = hit.position;
                reflect(&hit, &self.surface.normal(p.x, p.y))
            })
            .collect();
        Ok(traced(rays, &self.frame, self.global))
    }
    fn pupil_rays(&self) -> Option<RayBundle> {
        self.pupil.clone()
    }
}

/// Single refracting surface between two homogeneous media
///
/// The indices are evaluated at the wavelength of each ray.
pub struct Refractor<S: Surface, M1: Medium = f64, M2: Medium = f64> {
    surface: S,
    m1: M1,
    m2: M2,
    frame: CoordSys,
    pupil: Option<RayBundle>,
    global: bool,
}
impl<S: Surface, M1: Medium, M2: Medium> Refractor<S, M1, M2> {
    /// Refracting `surface` from medium `m1` into medium `m2`
    pub fn new(surface: S, m1: M1, m2: M2) -> Self {
        Self {
            surface,
            m1,
            m2,
            frame: Default::default(),
            pupil: None,
            global: false,
        }
    }
    pub fn frame(self, frame: CoordSys) -> Self {
        Self { frame, ..self }
    }
    pub fn pupil(self, rays: RayBundle) -> Self {
        Self {
            pupil: Some(rays),
            ..self
        }
    }
    /// Returns the traced rays in the global frame instead of the surface frame
    pub fn global_output(self, global: bool) -> Self {
        Self { global, ..self }
    }
}
impl<S: Surface, M1: Medium, M2: Medium> Optic for Refractor<S, M1, M2> {
    /// Intersects then refracts the rays, totally reflected rays are flagged as failed
    fn trace(&self, rays: &RayBundle) -> Result<Traced> {
        let rays = rays
            .par_iter()
            .map(|ray| {
                let hit = self.surface.intersect_or_vignette(&self.frame.to_local(ray));
                let p = hit.position;
                let (n1, n2) = (self.m1.n(hit.wavelength), self.m2.n(hit.wavelength));
                refract(&hit, &self.surface.normal(p.x, p.y), n1, n2).unwrap_or_else(|e| {
                    log::debug!("{hit}: {e}");
                    hit.failure()
                })
            })
            .collect();
        Ok(traced(rays, &self.frame, self.global))
    }
    fn pupil_rays(&self) -> Option<RayBundle> {
        self.pupil.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interaction::Cauchy, Plane, Quadric};

    #[test]
    fn frame_round_trip() {
        let frame = CoordSys::new(
            [0.1, -0.2, 3.],
            Rotation3::from_euler_angles(0.1, -0.05, 0.3),
        );
        let ray = Ray::new([1., 2., 3.], [0.1, 0., -1.], 0.5, 1e-6);
        let back = frame.to_global(&frame.to_local(&ray));
        assert!((back.position() - ray.position()).norm() < 1e-14);
        assert!((back.direction() - ray.direction()).norm() < 1e-15);
        assert_eq!(back.time(), ray.time());
        let local = CoordSys::default().to_local(&ray);
        assert_eq!(local, ray);
    }

    #[test]
    fn paraboloid_focus() {
        let mirror = Mirror::new(Quadric::paraboloid(20.));
        let rays = RayBundle::collimated_grid([0., 0., 15.], [0., 0., -1.], 2., 11, 0., 1e-6);
        let traced = mirror.trace(&rays).unwrap();
        for ray in &traced.rays {
            // every reflected ray goes through the focus
            let p = ray.position();
            let v = ray.direction();
            let t = (10. - p.z) / v.z;
            if p.x.hypot(p.y) > 0. {
                assert!((p.x + v.x * t).abs() < 1e-12);
                assert!((p.y + v.y * t).abs() < 1e-12);
            }
            assert!((v.norm() - 1.).abs() < 1e-14);
        }
        assert_eq!(traced.frame, CoordSys::default());
    }

    #[test]
    fn shifted_mirror() {
        let frame = CoordSys::new([0., 0., -2.], Rotation3::identity());
        let mirror = Mirror::new(Plane::new()).frame(frame.clone());
        let rays: RayBundle = vec![Ray::new([0.5, 0., 1.], [0., 0., -1.], 0., 1e-6)].into();
        let traced = mirror.trace(&rays).unwrap();
        let ray = &traced.rays[0];
        assert_eq!(*ray.position(), Vector3::new(0.5, 0., 0.));
        assert_eq!(*ray.direction(), Vector3::new(0., 0., 1.));
        assert_eq!(ray.time(), 3.);
        assert_eq!(traced.frame, frame);
    }

    #[test]
    fn global_output() {
        let frame = CoordSys::new(
            [0.2, -0.1, -2.],
            Rotation3::from_euler_angles(0.05, -0.1, 0.2),
        );
        let rays = RayBundle::collimated_grid([0., 0., 1.], [0., 0., -1.], 1., 5, 0., 1e-6);
        let local = Mirror::new(Quadric::paraboloid(20.))
            .frame(frame.clone())
            .trace(&rays)
            .unwrap();
        let global = Mirror::new(Quadric::paraboloid(20.))
            .frame(frame.clone())
            .global_output(true)
            .trace(&rays)
            .unwrap();
        assert_eq!(global.frame, CoordSys::default());
        for ((l, g), r) in local.rays.iter().zip(global.rays.iter()).zip(rays.iter()) {
            let expected = frame.to_global(l);
            assert!((g.position() - expected.position()).norm() < 1e-14);
            assert!((g.direction() - expected.direction()).norm() < 1e-15);
            assert_eq!(g.time(), l.time());
            // the hit lies on the incoming vertical ray
            assert!((g.position().x - r.position().x).abs() < 1e-12);
            assert!((g.position().y - r.position().y).abs() < 1e-12);
        }
    }

    #[test]
    fn dispersive_refractor() {
        let glass = Cauchy::new(1.5046, 4.2e-15);
        let prism = Refractor::new(Plane::new(), 1., glass);
        let theta: f64 = 0.4;
        let rays: RayBundle = [0.45e-6, 0.9e-6]
            .into_iter()
            .map(|wavelength| {
                Ray::new([0., 0., 1.], [theta.sin(), 0., -theta.cos()], 0., wavelength)
            })
            .collect();
        let traced = prism.trace(&rays).unwrap();
        for ray in traced.rays.iter() {
            let n2 = glass.n(ray.wavelength());
            assert!((ray.refractive_index() - n2).abs() < 1e-12);
            let v = ray.direction();
            assert!((n2 * v.x / v.norm() - theta.sin()).abs() < 1e-12);
        }
        // blue is bent more than red
        let (blue, red) = (traced.rays[0].direction(), traced.rays[1].direction());
        assert!(blue.x / blue.norm() < red.x / red.norm());
    }

    #[test]
    fn refractor_tir() {
        let glass = Refractor::new(Plane::new(), 1.5, 1.);
        let theta: f64 = 1.;
        let rays: RayBundle = vec![
            Ray::new([0., 0., 1.], [theta.sin() / 1.5, 0., -theta.cos() / 1.5], 0., 1e-6),
            Ray::new([0., 0., 1.], [0., 0., -1. / 1.5], 0., 1e-6),
        ]
        .into();
        let traced = glass.trace(&rays).unwrap();
        assert!(traced.rays[0].is_failed());
        assert!(!traced.rays[1].is_vignetted());
        assert!((traced.rays[1].refractive_index() - 1.).abs() < 1e-14);
        assert!(glass.pupil_rays().is_none());
    }
}
