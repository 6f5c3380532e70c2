use nalgebra::Vector2;
use ndarray::{s, Array1, Array2, ArrayView1};
use ndarray_stats::QuantileExt;
use tracing::info;

use super::{
    config::simulation::SimulationParameters,
    ode::{DormandPrince, SolverError},
    pendulum::Pendulum,
};

/// Absorbs rounding when the duration is a whole multiple of the step.
const GRID_EPSILON: f64 = 1e-9;

/// Most samples whose (theta, omega) rows ndarray can address.
const MAX_SAMPLES: usize = isize::MAX.unsigned_abs() / (2 * std::mem::size_of::<f64>());

/// Sample times 0, dt, 2 dt, ... strictly below the duration.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Array1<f64>,
    step_s: f64,
}

impl TimeGrid {
    /// Builds a grid of floor(duration / step) samples. Non-positive
    /// durations give an empty grid.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::GridTooLarge` if the sample count cannot be
    /// stored.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn new(duration_s: i64, step_s: f64) -> Result<Self, SolverError> {
        let samples = if duration_s > 0 && step_s > 0.0 {
            let samples = (duration_s as f64 / step_s + GRID_EPSILON).floor();
            if !samples.is_finite() || samples > MAX_SAMPLES as f64 {
                return Err(SolverError::GridTooLarge { duration_s, step_s });
            }
            samples as usize
        } else {
            0
        };
        let times = Array1::from_shape_fn(samples, |index| index as f64 * step_s);
        Ok(Self { times, step_s })
    }

    #[must_use]
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    #[must_use]
    pub const fn step_s(&self) -> f64 {
        self.step_s
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Solved pendulum states, one row (theta, omega) per grid time.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    grid: TimeGrid,
    states: Array2<f64>,
}

impl Trajectory {
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.nrows() == 0
    }

    #[must_use]
    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.grid.times()
    }

    #[must_use]
    pub fn angles(&self) -> ArrayView1<'_, f64> {
        self.states.slice(s![.., 0])
    }

    #[must_use]
    pub fn velocities(&self) -> ArrayView1<'_, f64> {
        self.states.slice(s![.., 1])
    }

    #[must_use]
    pub fn state(&self, index: usize) -> Option<Vector2<f64>> {
        (index < self.len())
            .then(|| Vector2::new(self.states[[index, 0]], self.states[[index, 1]]))
    }

    #[must_use]
    pub const fn time_step_s(&self) -> f64 {
        self.grid.step_s()
    }

    /// Frames per second that play the trajectory back in real time.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn frame_rate(&self) -> u32 {
        (1.0 / self.grid.step_s()).round() as u32
    }

    /// Largest absolute angle, `None` for an empty or non-finite trajectory.
    #[must_use]
    pub fn max_abs_angle(&self) -> Option<f64> {
        self.angles().mapv(f64::abs).max().ok().copied()
    }
}

/// Integrates the pendulum over the time grid of `parameters` with the
/// default integrator settings.
///
/// # Errors
///
/// Returns an error if the time grid is too large or the integrator fails,
/// e.g. for parameters that make the solution diverge.
#[tracing::instrument(level = "info")]
pub fn solve(parameters: &SimulationParameters) -> Result<Trajectory, SolverError> {
    solve_with(parameters, &DormandPrince::default())
}

/// Integrates the pendulum over the time grid of `parameters`.
///
/// # Errors
///
/// Returns an error if the integrator fails.
#[tracing::instrument(level = "debug")]
pub fn solve_with(
    parameters: &SimulationParameters,
    integrator: &DormandPrince,
) -> Result<Trajectory, SolverError> {
    let grid = TimeGrid::new(parameters.duration_s, parameters.time_step_s)?;
    let pendulum = Pendulum::from_parameters(parameters);

    let states =
        integrator.integrate(&pendulum, parameters.initial_state().as_slice(), grid.times())?;

    let trajectory = Trajectory { grid, states };
    info!(
        "Solved {} samples, max |theta| = {:?}",
        trajectory.len(),
        trajectory.max_abs_angle()
    );
    Ok(trajectory)
}
