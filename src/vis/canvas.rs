use anyhow::{Context, Result};
use image::RgbImage;
use plotters::prelude::*;
use tracing::trace;

use super::frame::{Frame, Viewport};
use crate::core::config::render::RenderOptions;

/// Reusable RGB raster that pendulum frames are drawn into.
///
/// Axes are hidden; only the rod and the two markers are drawn, in black on
/// white.
#[derive(Debug)]
pub struct Canvas {
    image: RgbImage,
    viewport: Viewport,
    line_width_px: u32,
    marker_radius_px: u32,
}

impl Canvas {
    /// Allocates a canvas sized by `options` whose viewport fits a rod of
    /// `length`.
    #[must_use]
    #[tracing::instrument(level = "debug")]
    pub fn new(options: &RenderOptions, length: f64) -> Self {
        let (width, height) = options.resolution();
        Self {
            image: RgbImage::new(width, height),
            viewport: Viewport::new(length, options.viewport_margin, (width, height)),
            line_width_px: options.line_width_px(),
            marker_radius_px: options.marker_radius_px(),
        }
    }

    #[must_use]
    pub fn resolution(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Draws `frame` over a blank background and returns the raster.
    ///
    /// # Errors
    ///
    /// Returns an error if the plotting backend fails.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn draw(&mut self, frame: &Frame) -> Result<&RgbImage> {
        trace!("Drawing frame.");
        let resolution = self.image.dimensions();
        {
            let buffer: &mut [u8] = &mut self.image;
            let root = BitMapBackend::with_buffer(buffer, resolution).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(self.viewport.x.clone(), self.viewport.y.clone())?;

            let points = [frame.pivot, frame.bob];
            chart.draw_series(LineSeries::new(
                points,
                BLACK.stroke_width(self.line_width_px),
            ))?;
            chart.draw_series(
                points
                    .iter()
                    .map(|point| Circle::new(*point, self.marker_radius_px, BLACK.filled())),
            )?;

            root.present()
                .with_context(|| format!("Failed to draw frame {}", frame.index))?;
        } // dropping bitmap backend

        Ok(&self.image)
    }
}

#[cfg(test)]
mod test {
    use image::Rgb;

    use super::*;

    fn small_options() -> RenderOptions {
        RenderOptions {
            figure_width_in: 2.0,
            figure_height_in: 2.0,
            dpi: 50,
            line_width_pt: 8.0,
            ..RenderOptions::default()
        }
    }

    /// Maps a data coordinate to its pixel for a square canvas.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn to_pixel(canvas: &Canvas, point: (f64, f64)) -> (u32, u32) {
        let (width, height) = canvas.resolution();
        let viewport = canvas.viewport();
        let x = (point.0 - viewport.x.start) / (viewport.x.end - viewport.x.start);
        let y = (viewport.y.end - point.1) / (viewport.y.end - viewport.y.start);
        (
            (x * f64::from(width - 1)).round() as u32,
            (y * f64::from(height - 1)).round() as u32,
        )
    }

    #[test]
    fn canvas_matches_configured_resolution() {
        let canvas = Canvas::new(&RenderOptions::default(), 1.0);

        assert_eq!(canvas.resolution(), (1280, 960));
    }

    #[test]
    fn draws_rod_and_markers_on_white() {
        let mut canvas = Canvas::new(&small_options(), 1.0);
        let frame = Frame::from_angle(0, 0.0, 1.0);
        let pivot_px = to_pixel(&canvas, frame.pivot);
        let bob_px = to_pixel(&canvas, frame.bob);
        let midpoint_px = to_pixel(&canvas, (0.0, -0.5));

        let image = canvas.draw(&frame).unwrap();

        assert_eq!(*image.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*image.get_pixel(pivot_px.0, pivot_px.1), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(bob_px.0, bob_px.1), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(midpoint_px.0, midpoint_px.1), Rgb([0, 0, 0]));
    }

    #[test]
    fn redraw_clears_previous_frame() {
        let mut canvas = Canvas::new(&small_options(), 1.0);
        let left = Frame::from_angle(0, -std::f64::consts::FRAC_PI_2, 1.0);
        let left_px = to_pixel(&canvas, left.bob);

        canvas.draw(&left).unwrap();
        let image = canvas.draw(&Frame::from_angle(1, 0.0, 1.0)).unwrap();

        assert_eq!(*image.get_pixel(left_px.0, left_px.1), Rgb([255, 255, 255]));
    }
}
