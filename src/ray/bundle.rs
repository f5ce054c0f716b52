use std::ops::Deref;

use itertools::iproduct;
use nalgebra::Vector3;
use rayon::iter::{FromParallelIterator, IntoParallelIterator};

use super::Ray;

/// Ordered collection of [Ray]s
///
/// The order is preserved by every operation so that rays can be paired with the samples
/// of the grid they were generated from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RayBundle(Vec<Ray>);
impl Deref for RayBundle {
    type Target = [Ray];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl From<Vec<Ray>> for RayBundle {
    fn from(rays: Vec<Ray>) -> Self {
        Self(rays)
    }
}
impl FromIterator<Ray> for RayBundle {
    fn from_iter<T: IntoIterator<Item = Ray>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl FromParallelIterator<Ray> for RayBundle {
    fn from_par_iter<I>(par_iter: I) -> Self
    where
        I: IntoParallelIterator<Item = Ray>,
    {
        Self(Vec::from_par_iter(par_iter))
    }
}
impl IntoIterator for RayBundle {
    type Item = Ray;
    type IntoIter = std::vec::IntoIter<Ray>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
impl<'a> IntoIterator for &'a RayBundle {
    type Item = &'a Ray;
    type IntoIter = std::slice::Iter<'a, Ray>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
impl RayBundle {
    /// Square grid of `n`×`n` parallel rays
    ///
    /// The rays are launched at time `time` from the plane perpendicular to `direction`
    /// that contains `center`, covering a `width`×`width` square.
    /// Rays are ordered with `x` varying slowest then `y`, in the plane frame.
    pub fn collimated_grid(
        center: impl Into<Vector3<f64>>,
        direction: impl Into<Vector3<f64>>,
        width: f64,
        n: usize,
        time: f64,
        wavelength: f64,
    ) -> Self {
        let center = center.into();
        let direction = direction.into();
        let u = direction.normalize();
        // any unit vector not parallel to the direction
        let seed = if u.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let e1 = (seed - u * u.dot(&seed)).normalize();
        let e2 = u.cross(&e1);
        let step = if n > 1 { width / (n - 1) as f64 } else { 0f64 };
        let offset = |i: usize| -0.5 * width + step * i as f64;
        iproduct!(0..n, 0..n)
            .map(|(i, j)| {
                Ray::new(
                    center + e1 * offset(i) + e2 * offset(j),
                    direction,
                    time,
                    wavelength,
                )
            })
            .collect()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// New bundle with only the rays that are not vignetted, in the same order
    pub fn trim_vignetted(&self) -> Self {
        self.0.iter().filter(|r| !r.vignetted).cloned().collect()
    }
    /// Number of vignetted rays
    pub fn n_vignetted(&self) -> usize {
        self.0.iter().filter(|r| r.vignetted).count()
    }
    /// Number of rays which last interaction failed
    pub fn n_failed(&self) -> usize {
        self.0.iter().filter(|r| r.failed).count()
    }
}
