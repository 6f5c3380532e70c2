use tracing::debug;

/// Typographic points per inch, used to turn point sizes into pixels.
const POINTS_PER_INCH: f64 = 72.0;

/// Raster size and drawing style of the animation frames.
///
/// The pixel size of a frame is the figure size in inches times `dpi`.
/// Line width and marker size are given in points and scale with `dpi`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct RenderOptions {
    pub figure_width_in: f64,
    pub figure_height_in: f64,
    pub dpi: u32,
    pub line_width_pt: f64,
    /// Diameter of the pivot and bob markers.
    pub marker_size_pt: f64,
    /// Half-extent of the visible area in units of the rod length.
    pub viewport_margin: f64,
}

impl Default for RenderOptions {
    /// Returns a 6.4 x 4.8 inch figure at 200 DPI with a 2 pt rod,
    /// 10 pt markers and a 10% margin around the swing.
    #[tracing::instrument(level = "debug")]
    fn default() -> Self {
        debug!("Creating default render options");
        Self {
            figure_width_in: 6.4,
            figure_height_in: 4.8,
            dpi: 200,
            line_width_pt: 2.0,
            marker_size_pt: 10.0,
            viewport_margin: 1.1,
        }
    }
}

impl RenderOptions {
    /// Frame size in pixels as (width, height).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resolution(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.figure_width_in * dpi).round().max(1.0) as u32,
            (self.figure_height_in * dpi).round().max(1.0) as u32,
        )
    }

    #[must_use]
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * f64::from(self.dpi) / POINTS_PER_INCH
    }

    /// Rod stroke width in whole pixels, at least one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn line_width_px(&self) -> u32 {
        self.points_to_pixels(self.line_width_pt).round().max(1.0) as u32
    }

    /// Marker radius in whole pixels, at least one.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn marker_radius_px(&self) -> u32 {
        (self.points_to_pixels(self.marker_size_pt) / 2.0)
            .round()
            .max(1.0) as u32
    }
}
