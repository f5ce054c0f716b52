//! # Zernike surfaces and Huygens PSF
//!
//! Optical surfaces described by Zernike polynomial expansions over circular or annular
//! apertures, ray/surface intersection by Newton iteration and diffraction point spread
//! functions from the coherent sum of Huygens wavelets carried by traced rays.
//!
//! ```no_run
//! use zernike_trace::{huygens_psf, meshgrid, Mirror, RayBundle, Zernike};
//!
//! # fn main() -> zernike_trace::Result<()> {
//! let mirror = Zernike::new(vec![0., 0., 0., 0., 2.5e-2], 1., 0.)?;
//! let rays = RayBundle::collimated_grid([0., 0., 1.], [0., 0., -1.], 2., 64, 0., 500e-9);
//! let offsets: Vec<f64> = (-16..16).map(|k| k as f64 * 1e-6).collect();
//! let (x, y) = meshgrid(&offsets, &offsets);
//! let z = nalgebra::DMatrix::from_element(32, 32, 2.84);
//! let _psf = huygens_psf(&Mirror::new(mirror), &x, &y, Some(&z), Some(&rays))?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod interaction;
pub mod newton;
pub mod optic;
pub mod polynomial;
pub mod psf;
pub mod ray;
pub mod surface;
pub mod zernike;

pub use error::{Error, Result};
pub use interaction::{Cauchy, Medium};
pub use newton::{Intersector, NewtonState};
pub use optic::{CoordSys, Mirror, Optic, Refractor, Traced};
pub use psf::{huygens_psf, meshgrid, AmplitudeKernel, Huygens, Kernel, SampleGrid};
pub use ray::{Ray, RayBundle};
pub use surface::{Plane, Quadric, Surface};
pub use zernike::Zernike;
