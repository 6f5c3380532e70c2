pub mod config;
pub mod ode;
pub mod pendulum;
pub mod trajectory;
