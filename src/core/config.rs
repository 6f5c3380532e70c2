pub mod render;
pub mod simulation;

use std::path::PathBuf;

use tracing::info;

use self::{render::RenderOptions, simulation::SimulationParameters};

/// Default path of the encoded animation.
pub const DEFAULT_OUTPUT: &str = "pendulum.mp4";

/// Struct to hold the configuration for one animation run.
///
/// Contains fields for:
///
/// - `simulation`: Physical and numerical parameters of the pendulum.
/// - `render`: Raster size and drawing style of the frames.
/// - `output`: Path of the video file to write.
#[derive(Debug, PartialEq, Clone)]
pub struct Config {
    pub simulation: SimulationParameters,
    pub render: RenderOptions,
    pub output: PathBuf,
}

impl Config {
    /// Creates a config for the given simulation parameters with default
    /// rendering options and the default output path.
    #[must_use]
    #[tracing::instrument(level = "info")]
    pub fn new(simulation: SimulationParameters) -> Self {
        info!("Creating config");
        Self {
            simulation,
            render: RenderOptions::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    /// Replaces the output path.
    #[must_use]
    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_uses_default_output_and_render_options() {
        let config = Config::new(SimulationParameters::new(5, 9.8, 1.0));

        assert_eq!(config.output, PathBuf::from("pendulum.mp4"));
        assert_eq!(config.render, RenderOptions::default());
        assert_eq!(config.simulation.duration_s, 5);
    }

    #[test]
    fn with_output_replaces_path() {
        let config =
            Config::new(SimulationParameters::new(1, 1.0, 1.0)).with_output("out/swing.gif");

        assert_eq!(config.output, PathBuf::from("out/swing.gif"));
    }
}
