use crate::{
    polynomial::PolynomialError, psf::PsfError, surface::SurfaceError, zernike::ZernikeError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `polynomial` module")]
    Polynomial(#[from] PolynomialError),
    #[error("Error in the `zernike` module")]
    Zernike(#[from] ZernikeError),
    #[error("Error in the `surface` module")]
    Surface(#[from] SurfaceError),
    #[error("Error in the `psf` module")]
    Psf(#[from] PsfError),
}
pub type Result<T> = std::result::Result<T, Error>;
