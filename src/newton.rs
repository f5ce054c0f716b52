//! Newton ray/surface intersection
//!
//! The ray `p(t) = p₀ + v(t - t₀)` crosses the surface where
//! `f(t) = z(t) - sag(x(t), y(t))` vanishes. Starting from the crossing of the `z = 0`
//! plane, `t` is updated with `t ← t - f/f'` where `f' = v_z - ∂sag/∂x·v_x - ∂sag/∂y·v_y`.

use crate::{
    surface::{Plane, Surface, SurfaceError},
    Ray,
};

type Result<T> = std::result::Result<T, SurfaceError>;

/// Default absolute tolerance on the residual `|z - sag|`
pub const DEFAULT_TOLERANCE: f64 = 1e-9;
/// Default maximum number of Newton updates
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Newton iteration state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewtonState {
    /// Residual still above tolerance, next guess of the intersection time
    Iterating { iteration: usize, time: f64 },
    /// Residual below tolerance at the given time
    Converged { iteration: usize, time: f64 },
    Failed(NewtonFailure),
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NewtonFailure {
    /// Residual at the last iteration
    MaxIterExceeded { residual: f64 },
    /// `f'` vanished, or the update was not finite
    ZeroDerivative { iteration: usize },
}
/// Newton root-finder configuration
#[derive(Debug, Clone, Copy)]
pub struct Intersector {
    tolerance: f64,
    max_iterations: usize,
}
impl Default for Intersector {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}
impl Intersector {
    /// Sets the absolute tolerance on the residual
    pub fn tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }
    /// Sets the maximum number of Newton updates
    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }
    /// Initial state: crossing of the `z = 0` plane, or the ray time if the ray is
    /// parallel to the plane
    pub fn start(&self, ray: &Ray) -> NewtonState {
        NewtonState::Iterating {
            iteration: 0,
            time: ray.time + Plane::crossing_time(ray).unwrap_or_default(),
        }
    }
    /// One transition of the state machine
    ///
    /// `Converged` and `Failed` are terminal and returned unchanged.
    pub fn step<S: Surface + ?Sized>(
        &self,
        surface: &S,
        ray: &Ray,
        state: NewtonState,
    ) -> NewtonState {
        let NewtonState::Iterating { iteration, time } = state else {
            return state;
        };
        let p = ray.position_at_time(time);
        let residual = p.z - surface.sag(p.x, p.y);
        if residual.abs() < self.tolerance {
            return NewtonState::Converged { iteration, time };
        }
        if iteration >= self.max_iterations {
            return NewtonState::Failed(NewtonFailure::MaxIterExceeded {
                residual: residual.abs(),
            });
        }
        let (dzdx, dzdy) = surface.gradient(p.x, p.y);
        let v = &ray.direction;
        let derivative = v.z - dzdx * v.x - dzdy * v.y;
        let update = residual / derivative;
        if derivative == 0f64 || !update.is_finite() {
            return NewtonState::Failed(NewtonFailure::ZeroDerivative { iteration });
        }
        NewtonState::Iterating {
            iteration: iteration + 1,
            time: time - update,
        }
    }
    /// Iterates until a terminal state is reached and returns the intersected ray
    pub fn solve<S: Surface + ?Sized>(&self, surface: &S, ray: &Ray) -> Result<Ray> {
        if ray.failed {
            return Err(SurfaceError::PreviouslyFailed);
        }
        let mut state = self.start(ray);
        loop {
            state = match self.step(surface, ray, state) {
                NewtonState::Converged { time, .. } => return Ok(ray.propagated_to_time(time)),
                NewtonState::Failed(NewtonFailure::MaxIterExceeded { residual }) => {
                    return Err(SurfaceError::NonConvergence {
                        iterations: self.max_iterations,
                        residual,
                    })
                }
                NewtonState::Failed(NewtonFailure::ZeroDerivative { iteration }) => {
                    return Err(SurfaceError::Stalled { iteration })
                }
                state => state,
            }
        }
    }
}
