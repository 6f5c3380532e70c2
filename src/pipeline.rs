use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    core::{config::Config, trajectory::solve},
    vis::animation::Animation,
};

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub output: PathBuf,
    pub frames: usize,
    pub frame_rate: u32,
    pub resolution: (u32, u32),
}

/// Solves the pendulum, renders every sample and saves the video.
///
/// Progress is announced on stdout one stage at a time. Nothing is reported
/// as saved unless the encoder finished.
///
/// # Errors
///
/// Returns an error if integration, drawing or encoding fails.
#[tracing::instrument(level = "info", skip(config), fields(output = %config.output.display()))]
pub fn run(config: &Config) -> Result<Summary> {
    println!("Solving ODE...");
    let trajectory = solve(&config.simulation).context("Failed to solve pendulum ODE")?;

    println!("Plotting animation...");
    let mut animation = Animation::new(&trajectory, config.simulation.length, &config.render);
    info!(
        "Animation has {} frames of {:?} px",
        animation.frame_count(),
        animation.resolution()
    );

    println!("Saving animation...");
    let frames = animation
        .save(&config.output)
        .context("Failed to save animation")?;
    println!("Saved animation to {}", config.output.display());

    Ok(Summary {
        output: config.output.clone(),
        frames,
        frame_rate: animation.frame_rate(),
        resolution: animation.resolution(),
    })
}
