use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use ::gif::{Encoder, Frame, Repeat};
use image::{Rgb, RgbImage};
use tracing::{debug, info};

use super::{check_frame_size, Container, EncodeError, VideoEncoder};

/// GIF delays are counted in hundredths of a second.
const CENTISECONDS_PER_SECOND: u32 = 100;

/// Writes an endlessly looping GIF.
///
/// The global palette holds 256 gray levels and every pixel is stored as its
/// luma, which is exact for the black on white pendulum frames.
pub struct GifEncoder {
    encoder: Option<Encoder<BufWriter<File>>>,
    path: PathBuf,
    resolution: (u32, u32),
    width: u16,
    height: u16,
    delay_cs: u16,
    frame_rate: u32,
    frames_written: usize,
}

impl GifEncoder {
    /// Creates the file at `path` and writes the GIF header.
    ///
    /// The per-frame delay is `100 / frame_rate` centiseconds, so rates that
    /// do not divide 100 are rounded down to the next representable delay.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, the frame size does
    /// not fit a GIF, or the header cannot be written.
    #[tracing::instrument(level = "debug")]
    pub fn create(path: &Path, resolution: (u32, u32), frame_rate: u32) -> Result<Self, EncodeError> {
        if frame_rate == 0 {
            return Err(EncodeError::InvalidFrameRate);
        }
        let too_large = || EncodeError::FrameTooLarge {
            size: resolution,
            container: Container::Gif,
        };
        let width = u16::try_from(resolution.0).map_err(|_| too_large())?;
        let height = u16::try_from(resolution.1).map_err(|_| too_large())?;
        let delay_cs = u16::try_from((CENTISECONDS_PER_SECOND / frame_rate).max(1))
            .map_err(|_| EncodeError::InvalidFrameRate)?;

        let file = File::create(path).map_err(|source| EncodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let palette: Vec<u8> = (0..=u8::MAX).flat_map(|level| [level; 3]).collect();
        let mut encoder = Encoder::new(BufWriter::new(file), width, height, &palette)?;
        encoder.set_repeat(Repeat::Infinite)?;
        debug!("Opened {} with a delay of {delay_cs} cs", path.display());

        Ok(Self {
            encoder: Some(encoder),
            path: path.to_path_buf(),
            resolution,
            width,
            height,
            delay_cs,
            frame_rate,
            frames_written: 0,
        })
    }
}

impl VideoEncoder for GifEncoder {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), EncodeError> {
        check_frame_size(frame, self.resolution)?;
        let encoder = self.encoder.as_mut().ok_or(EncodeError::Finished)?;

        let indices: Vec<u8> = frame.pixels().map(luma).collect();
        let gif_frame = Frame {
            delay: self.delay_cs,
            width: self.width,
            height: self.height,
            buffer: Cow::Owned(indices),
            ..Frame::default()
        };
        encoder.write_frame(&gif_frame)?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EncodeError> {
        let encoder = self.encoder.take().ok_or(EncodeError::Finished)?;
        if self.frames_written == 0 {
            return Err(EncodeError::NoFrames);
        }
        let mut writer = encoder.into_inner()?;
        writer.flush()?;
        info!(
            "Wrote {} frames to {}",
            self.frames_written,
            self.path.display()
        );
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.frames_written
    }

    fn frame_rate(&self) -> u32 {
        self.frame_rate
    }
}

/// Rec. 601 luma, used directly as the gray palette index.
#[allow(clippy::cast_possible_truncation)]
fn luma(pixel: &Rgb<u8>) -> u8 {
    let [red, green, blue] = pixel.0;
    let weighted = 299 * u32::from(red) + 587 * u32::from(green) + 114 * u32::from(blue);
    ((weighted + 500) / 1000) as u8
}
