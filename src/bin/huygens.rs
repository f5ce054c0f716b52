//! Through-focus Huygens PSF
//!
//! A collimated beam is reflected by a Zernike mirror and the Huygens PSF is computed on
//! planes around the focus.

use std::time::Instant;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use structopt::StructOpt;
use zernike_trace::{Huygens, Kernel, Mirror, Optic, RayBundle, SampleGrid, Surface, Zernike};

#[derive(Debug, StructOpt)]
#[structopt(name = "huygens", about = "Through-focus Huygens PSF of a Zernike mirror")]
struct Opt {
    /// Zernike coefficients in Noll order, the first one is ignored
    #[structopt(long, use_delimiter = true, default_value = "0,0,0,0,0.025")]
    coefs: Vec<f64>,
    /// Mirror outer radius
    #[structopt(long, default_value = "1")]
    r_outer: f64,
    /// Mirror inner radius
    #[structopt(long, default_value = "0")]
    r_inner: f64,
    /// Wavelength
    #[structopt(long, default_value = "500e-9")]
    wavelength: f64,
    /// Number of rays across the mirror diameter
    #[structopt(long, default_value = "64")]
    n_rays: usize,
    /// Number of pixels across the PSF
    #[structopt(long, default_value = "33")]
    n_pixel: usize,
    /// PSF pixel size
    #[structopt(long, default_value = "1e-6")]
    pixel_scale: f64,
    /// Focal plane height, estimated from the mirror curvature if omitted
    #[structopt(long)]
    focus: Option<f64>,
    /// Number of planes of the through-focus scan
    #[structopt(long, default_value = "1")]
    n_focus: usize,
    /// Distance between the planes of the through-focus scan
    #[structopt(long, default_value = "1e-5")]
    focus_step: f64,
    /// Wavelet kernel: plane-wave or spherical-wavelet
    #[structopt(long, default_value = "plane-wave")]
    kernel: Kernel,
}

/// Paraboloid focus matching the mirror curvature at the vertex
fn paraxial_focus(mirror: &Zernike) -> Option<f64> {
    let curvature = mirror.grad_x().grad_x().sag(0., 0.);
    (curvature > 0f64).then(|| mirror.sag(0., 0.) + 0.5 / curvature)
}

/// Traces the collimated beam off the mirror
fn trace(opt: &Opt) -> zernike_trace::Result<(Option<f64>, Huygens<Kernel>)> {
    let mirror = Zernike::new(opt.coefs.clone(), opt.r_outer, opt.r_inner)?;
    let focus = opt.focus.or_else(|| paraxial_focus(&mirror));
    let rays = RayBundle::collimated_grid(
        [0., 0., mirror.sag(0., 0.) + opt.r_outer],
        [0., 0., -1.],
        2. * opt.r_outer,
        opt.n_rays,
        0.,
        opt.wavelength,
    );
    let traced = Mirror::new(mirror).trace(&rays)?;
    log::info!(
        "{} rays traced: {} vignetted, {} failed",
        traced.rays.len(),
        traced.rays.n_vignetted(),
        traced.rays.n_failed()
    );
    Ok((focus, Huygens::new(&traced.rays)?.kernel(opt.kernel)))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let now = Instant::now();
    let (focus, huygens) = trace(&opt)?;
    let Some(focus) = focus else {
        anyhow::bail!("the mirror is not focusing, the focal plane must be given with --focus");
    };
    println!(
        "{} rays traced in {}ms, focus: {focus:.6}",
        huygens.n_ray(),
        now.elapsed().as_millis()
    );

    let n2 = (huygens.n_ray() * huygens.n_ray()) as f64;
    let planes: Vec<f64> = (0..opt.n_focus)
        .map(|k| focus + (k as f64 - 0.5 * (opt.n_focus as f64 - 1.)) * opt.focus_step)
        .collect();
    let pb = ProgressBar::new(planes.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    let stats: Vec<_> = planes
        .par_iter()
        .progress_with(pb)
        .map(|&z| {
            let grid = SampleGrid::square([0., 0., z], opt.n_pixel, opt.pixel_scale);
            let psf = huygens.psf(&grid);
            let total = psf.sum();
            let centroid = (
                psf.component_mul(grid.x()).sum() / total,
                psf.component_mul(grid.y()).sum() / total,
            );
            (z, psf.max(), total, centroid)
        })
        .collect();

    println!("{:>12} {:>12} {:>10} {:>12} {:>22}", "z", "peak", "peak/N²", "total", "centroid");
    for (z, peak, total, (cx, cy)) in stats {
        println!(
            "{:>12.6} {:>12.4e} {:>10.6} {:>12.4e} ({:>+9.3e},{:>+9.3e})",
            z,
            peak,
            peak / n2,
            total,
            cx,
            cy
        );
    }

    Ok(())
}
