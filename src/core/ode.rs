use ivp::prelude::{solve_ivp, Method, Options, IVP};
use ndarray::{Array2, ArrayView1};
use thiserror::Error;
use tracing::debug;

/// Tolerance used by LSODA when none is given.
pub const DEFAULT_TOLERANCE: f64 = 1.49012e-8;

#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("requested times must be non-decreasing, index {index} goes backwards")]
    UnorderedTimes { index: usize },
    #[error("a grid of {duration_s} s at {step_s} s per sample does not fit in memory")]
    GridTooLarge { duration_s: i64, step_s: f64 },
    #[error("state became non-finite at t = {time}")]
    NonFinite { time: f64 },
    #[error("integration stopped after {reached} of {requested} output times ({status})")]
    Incomplete {
        reached: usize,
        requested: usize,
        status: String,
    },
    #[error("integrator rejected the problem: {0}")]
    Failed(String),
}

/// Adaptive Dormand-Prince 5(4) integration through `ivp::solve_ivp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DormandPrince {
    pub relative_tolerance: f64,
    pub absolute_tolerance: f64,
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self {
            relative_tolerance: DEFAULT_TOLERANCE,
            absolute_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl DormandPrince {
    /// Integrates `system` from `times[0]` and returns one row per entry of
    /// `times`. The first row is `initial_state`; repeated times repeat the
    /// state.
    ///
    /// # Errors
    ///
    /// Returns an error if `times` goes backwards, if the integrator fails
    /// or stops early, or if the state stops being finite.
    #[tracing::instrument(level = "debug", skip(self, system, initial_state, times))]
    pub fn integrate<S: IVP>(
        &self,
        system: &S,
        initial_state: &[f64],
        times: ArrayView1<f64>,
    ) -> Result<Array2<f64>, SolverError> {
        let mut states = Array2::zeros((times.len(), initial_state.len()));
        let Some(&start) = times.first() else {
            return Ok(states);
        };
        if let Some(position) = times
            .iter()
            .zip(times.iter().skip(1))
            .position(|(before, after)| after < before)
        {
            return Err(SolverError::UnorderedTimes {
                index: position + 1,
            });
        }

        // The solver wants strictly increasing output times.
        let mut unique: Vec<f64> = Vec::with_capacity(times.len());
        let mut slots = Vec::with_capacity(times.len());
        for &time in &times {
            if unique.last() != Some(&time) {
                unique.push(time);
            }
            slots.push(unique.len() - 1);
        }
        debug!("Integrating over {} distinct output times", unique.len());

        let mut solved = vec![initial_state.to_vec()];
        if let Some(&end) = unique.last().filter(|_| unique.len() > 1) {
            let options = Options::builder()
                .method(Method::DOPRI5)
                .rtol(self.relative_tolerance)
                .atol(self.absolute_tolerance)
                .t_eval(unique.clone())
                .build();
            let solution = solve_ivp(system, start, end, initial_state, options)
                .map_err(|error| SolverError::Failed(format!("{error:?}")))?;
            if solution.t.len() != unique.len() {
                return Err(SolverError::Incomplete {
                    reached: solution.t.len(),
                    requested: unique.len(),
                    status: format!("{:?}", solution.status),
                });
            }
            solved.extend(solution.y.into_iter().skip(1));
        }

        for (time, state) in unique.iter().zip(&solved) {
            if !state.iter().all(|value| value.is_finite()) {
                return Err(SolverError::NonFinite { time: *time });
            }
        }
        for (mut row, slot) in states.rows_mut().into_iter().zip(slots) {
            for (target, value) in row.iter_mut().zip(&solved[slot]) {
                *target = *value;
            }
        }
        Ok(states)
    }
}
