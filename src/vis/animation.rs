use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{
    canvas::Canvas,
    frame::FrameRenderer,
    video::{self, EncodeError, VideoEncoder},
};
use crate::core::{config::render::RenderOptions, trajectory::Trajectory};

/// Log a progress line every this many frames.
const PROGRESS_INTERVAL: usize = 100;

/// Frame-by-frame animation of a solved trajectory.
///
/// Frames are drawn one at a time and handed straight to the encoder, so no
/// more than one raster is alive at once.
#[derive(Debug)]
pub struct Animation<'a> {
    renderer: FrameRenderer<'a>,
    canvas: Canvas,
    frame_rate: u32,
}

impl<'a> Animation<'a> {
    /// Sets up an animation of `trajectory` for a rod of `length`, played at
    /// one frame per time step.
    #[must_use]
    #[tracing::instrument(level = "debug", skip(trajectory))]
    pub fn new(trajectory: &'a Trajectory, length: f64, options: &RenderOptions) -> Self {
        Self {
            renderer: FrameRenderer::new(trajectory, length),
            canvas: Canvas::new(options, length),
            frame_rate: trajectory.frame_rate(),
        }
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.renderer.len()
    }

    #[must_use]
    pub const fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    #[must_use]
    pub fn resolution(&self) -> (u32, u32) {
        self.canvas.resolution()
    }

    /// Encodes every frame into the video file at `path` and returns the
    /// number of frames written.
    ///
    /// An empty animation fails with `EncodeError::NoFrames` before the file
    /// is created.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to encode, if the output cannot
    /// be opened, or if drawing or encoding any frame fails.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn save(&mut self, path: &Path) -> Result<usize> {
        if self.renderer.is_empty() {
            return Err(EncodeError::NoFrames.into());
        }
        let mut encoder = video::open(path, self.resolution(), self.frame_rate)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let written = self.write_to(encoder.as_mut())?;
        encoder
            .finish()
            .with_context(|| format!("Failed to finish {}", path.display()))?;
        info!("Saved {written} frames at {} fps", self.frame_rate);
        Ok(written)
    }

    /// Draws all frames in trajectory order into `encoder` without finishing
    /// it.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing or writing a frame fails.
    pub fn write_to(&mut self, encoder: &mut dyn VideoEncoder) -> Result<usize> {
        let total = self.renderer.len();
        for frame in self.renderer.frames() {
            let image = self.canvas.draw(&frame)?;
            encoder
                .write_frame(image)
                .with_context(|| format!("Failed to encode frame {}", frame.index))?;
            if frame.index % PROGRESS_INTERVAL == 0 {
                debug!("Encoded frame {}/{total}", frame.index);
            }
        }
        Ok(encoder.frames_written())
    }
}
