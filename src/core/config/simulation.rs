use std::f64::consts::FRAC_PI_2;

use nalgebra::Vector2;
use tracing::debug;

/// Integration and sampling step in seconds. Also fixes the video frame rate.
pub const TIME_STEP_S: f64 = 0.01;
/// Release angle, measured from the downward vertical.
pub const INITIAL_ANGLE_RAD: f64 = -FRAC_PI_2;
pub const INITIAL_VELOCITY_RAD_PER_S: f64 = 0.0;
pub const DEFAULT_LENGTH: f64 = 1.0;

/// Parameters of a single pendulum run.
///
/// `frequency` takes the place of g/L in the pendulum equation.
/// `damping` enters the derivative as `2 * damping * length * omega`; no
/// command line option sets it, so it stays at zero outside of tests.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SimulationParameters {
    pub duration_s: i64,
    pub frequency: f64,
    pub length: f64,
    pub damping: f64,
    pub time_step_s: f64,
    pub initial_angle_rad: f64,
    pub initial_velocity_rad_per_s: f64,
}

impl SimulationParameters {
    /// Returns parameters for the given duration, frequency and rod length,
    /// released from -90 degrees at rest without damping.
    ///
    /// Values are not validated. A non-positive duration produces an empty
    /// trajectory.
    #[must_use]
    #[tracing::instrument(level = "debug")]
    pub fn new(duration_s: i64, frequency: f64, length: f64) -> Self {
        debug!("Creating simulation parameters");
        Self {
            duration_s,
            frequency,
            length,
            damping: 0.0,
            time_step_s: TIME_STEP_S,
            initial_angle_rad: INITIAL_ANGLE_RAD,
            initial_velocity_rad_per_s: INITIAL_VELOCITY_RAD_PER_S,
        }
    }

    /// State vector (angle, angular velocity) at t = 0.
    #[must_use]
    pub fn initial_state(&self) -> Vector2<f64> {
        Vector2::new(self.initial_angle_rad, self.initial_velocity_rad_per_s)
    }
}
