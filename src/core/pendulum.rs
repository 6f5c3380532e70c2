use ivp::prelude::IVP;
use nalgebra::Vector2;

use super::config::simulation::SimulationParameters;

/// Equation of motion of a rigid pendulum, state = (theta, omega).
///
/// theta' = omega
/// omega' = -frequency * sin(theta) - 2 * damping * length * omega
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pendulum {
    pub frequency: f64,
    pub damping: f64,
    pub length: f64,
}

impl Pendulum {
    #[must_use]
    pub const fn from_parameters(parameters: &SimulationParameters) -> Self {
        Self {
            frequency: parameters.frequency,
            damping: parameters.damping,
            length: parameters.length,
        }
    }

    /// Time derivative of the state.
    #[must_use]
    pub fn derivatives(&self, state: &Vector2<f64>) -> Vector2<f64> {
        let (angle, velocity) = (state[0], state[1]);
        let mut acceleration = -self.frequency * angle.sin();
        acceleration -= 2.0 * self.damping * self.length * velocity;
        Vector2::new(velocity, acceleration)
    }

    /// Energy per unit of inertia, conserved while `damping` is zero.
    #[must_use]
    pub fn energy(&self, state: &Vector2<f64>) -> f64 {
        (0.5 * state[1]).mul_add(state[1], -self.frequency * state[0].cos())
    }
}

impl IVP for Pendulum {
    fn ode(&self, _t: f64, state: &[f64], derivative: &mut [f64]) {
        let rates = self.derivatives(&Vector2::new(state[0], state[1]));
        derivative.copy_from_slice(rates.as_slice());
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;

    fn pendulum(damping: f64) -> Pendulum {
        Pendulum {
            frequency: 9.8,
            damping,
            length: 2.0,
        }
    }

    #[test]
    fn horizontal_release_accelerates_towards_bottom() {
        let derivatives = pendulum(0.0).derivatives(&Vector2::new(-FRAC_PI_2, 0.0));

        assert_relative_eq!(derivatives[0], 0.0);
        assert_relative_eq!(derivatives[1], 9.8);
    }

    #[test]
    fn equilibria_have_zero_acceleration() {
        let system = pendulum(0.0);

        assert_relative_eq!(system.derivatives(&Vector2::new(0.0, 0.0))[1], 0.0);
        assert_relative_eq!(
            system.derivatives(&Vector2::new(PI, 0.0))[1],
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn damping_opposes_velocity() {
        let derivatives = pendulum(0.25).derivatives(&Vector2::new(0.0, 3.0));

        assert_relative_eq!(derivatives[0], 3.0);
        assert_relative_eq!(derivatives[1], -2.0 * 0.25 * 2.0 * 3.0);
    }

    #[test]
    fn energy_of_rest_positions() {
        let system = pendulum(0.0);

        assert_relative_eq!(system.energy(&Vector2::new(0.0, 0.0)), -9.8);
        assert_relative_eq!(system.energy(&Vector2::new(-FRAC_PI_2, 0.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(system.energy(&Vector2::new(0.0, 2.0)), 2.0 - 9.8);
    }

    #[test]
    fn ode_writes_the_same_rates() {
        let system = pendulum(0.3);
        let mut rates = [0.0; 2];

        system.ode(0.0, &[0.4, -1.2], &mut rates);

        let expected = system.derivatives(&Vector2::new(0.4, -1.2));
        assert_relative_eq!(rates[0], expected[0]);
        assert_relative_eq!(rates[1], expected[1]);
    }

    #[test]
    fn from_parameters_copies_physics() {
        let mut parameters = SimulationParameters::new(3, 4.0, 0.7);
        parameters.damping = 0.1;

        let system = Pendulum::from_parameters(&parameters);

        assert_eq!(
            system,
            Pendulum {
                frequency: 4.0,
                damping: 0.1,
                length: 0.7
            }
        );
    }
}
