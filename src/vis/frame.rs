use std::ops::Range;

use crate::core::trajectory::Trajectory;

/// Rod of one animation frame, from the pivot at the origin to the bob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub pivot: (f64, f64),
    pub bob: (f64, f64),
}

impl Frame {
    /// Places the bob at (L sin theta, -L cos theta), so theta = 0 hangs
    /// straight down.
    #[must_use]
    pub fn from_angle(index: usize, angle_rad: f64, length: f64) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self {
            index,
            pivot: (0.0, 0.0),
            bob: (length * sin, -length * cos),
        }
    }

    #[must_use]
    pub fn rod_length(&self) -> f64 {
        (self.bob.0 - self.pivot.0).hypot(self.bob.1 - self.pivot.1)
    }
}

/// Visible data range of the animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub x: Range<f64>,
    pub y: Range<f64>,
}

impl Viewport {
    /// Covers +-`margin * length` on the shorter raster axis and widens the
    /// longer one so that both axes share one scale.
    #[must_use]
    pub fn new(length: f64, margin: f64, resolution: (u32, u32)) -> Self {
        let half = margin * length;
        let (width, height) = (f64::from(resolution.0), f64::from(resolution.1));
        let (half_x, half_y) = if width >= height {
            (half * width / height, half)
        } else {
            (half, half * height / width)
        };
        Self {
            x: -half_x..half_x,
            y: -half_y..half_y,
        }
    }
}

/// Turns the angles of a trajectory into frames, one per sample and in
/// sample order.
#[derive(Debug, Clone, Copy)]
pub struct FrameRenderer<'a> {
    trajectory: &'a Trajectory,
    length: f64,
}

impl<'a> FrameRenderer<'a> {
    #[must_use]
    pub const fn new(trajectory: &'a Trajectory, length: f64) -> Self {
        Self { trajectory, length }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn frame(&self, index: usize) -> Option<Frame> {
        self.trajectory
            .angles()
            .get(index)
            .map(|angle| Frame::from_angle(index, *angle, self.length))
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame> + 'a {
        let length = self.length;
        self.trajectory
            .angles()
            .into_iter()
            .enumerate()
            .map(move |(index, angle)| Frame::from_angle(index, *angle, length))
    }
}
