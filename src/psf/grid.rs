use nalgebra::{DMatrix, Vector3};

use super::{PsfError, Result};

/// Observation points of a PSF
///
/// The point `(x[(i,j)], y[(i,j)], z[(i,j)])` gives the intensity at `(i,j)` in the PSF
/// image.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    x: DMatrix<f64>,
    y: DMatrix<f64>,
    z: DMatrix<f64>,
}
impl SampleGrid {
    /// Creates a grid from same shape coordinate matrices, `z` defaults to 0
    pub fn new(x: DMatrix<f64>, y: DMatrix<f64>, z: Option<DMatrix<f64>>) -> Result<Self> {
        let z = z.unwrap_or_else(|| DMatrix::zeros(x.nrows(), x.ncols()));
        if x.shape() != y.shape() || x.shape() != z.shape() {
            return Err(PsfError::ShapeMismatch {
                x: x.shape(),
                y: y.shape(),
                z: z.shape(),
            });
        }
        Ok(Self { x, y, z })
    }
    /// `n`×`n` grid of pixels of size `pixel_scale` centered on `center`, in a plane of
    /// constant `z`
    ///
    /// Rows follow `y` and columns follow `x`.
    pub fn square(center: impl Into<Vector3<f64>>, n: usize, pixel_scale: f64) -> Self {
        let center = center.into();
        let offset = |k: usize| (k as f64 - 0.5 * (n as f64 - 1f64)) * pixel_scale;
        let xs: Vec<f64> = (0..n).map(|k| center.x + offset(k)).collect();
        let ys: Vec<f64> = (0..n).map(|k| center.y + offset(k)).collect();
        let (x, y) = meshgrid(&xs, &ys);
        Self {
            z: DMatrix::from_element(n, n, center.z),
            x,
            y,
        }
    }
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    /// Sample point at the column-major linear index `k`
    pub fn point(&self, k: usize) -> Vector3<f64> {
        Vector3::new(self.x[k], self.y[k], self.z[k])
    }
    pub fn x(&self) -> &DMatrix<f64> {
        &self.x
    }
    pub fn y(&self) -> &DMatrix<f64> {
        &self.y
    }
}

/// Coordinate matrices with `xs` along the columns and `ys` along the rows
pub fn meshgrid(xs: &[f64], ys: &[f64]) -> (DMatrix<f64>, DMatrix<f64>) {
    (
        DMatrix::from_fn(ys.len(), xs.len(), |_, j| xs[j]),
        DMatrix::from_fn(ys.len(), xs.len(), |i, _| ys[i]),
    )
}
