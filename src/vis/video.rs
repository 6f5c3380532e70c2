pub mod ffmpeg;
pub mod gif;

use std::{
    io,
    path::{Path, PathBuf},
    process::ExitStatus,
    str::FromStr,
};

use image::RgbImage;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use tracing::info;

use self::{ffmpeg::FfmpegEncoder, gif::GifEncoder};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("no frames to encode")]
    NoFrames,
    #[error("frame rate must be positive")]
    InvalidFrameRate,
    #[error("unsupported video container for {}", path.display())]
    UnsupportedContainer { path: PathBuf },
    #[error("frame is {}x{} but the video is {}x{}", actual.0, actual.1, expected.0, expected.1)]
    FrameSizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("frame size {}x{} is too large for {container}", size.0, size.1)]
    FrameTooLarge { size: (u32, u32), container: Container },
    #[error("could not open {} for writing", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write video data")]
    Write(#[from] io::Error),
    #[error("failed to encode gif")]
    Gif(#[from] ::gif::EncodingError),
    #[error("`{program}` could not be started, is it installed and on PATH?")]
    EncoderUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` failed ({status}): {stderr}")]
    EncoderFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("encoder was already finished")]
    Finished,
}

/// Video container, chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Container {
    Gif,
    Mp4,
    Mkv,
    Mov,
    Avi,
    Webm,
}

impl Container {
    /// Picks the container matching the extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::UnsupportedContainer` for a missing or unknown
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, EncodeError> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| Self::from_str(extension).ok())
            .ok_or_else(|| EncodeError::UnsupportedContainer {
                path: path.to_path_buf(),
            })
    }
}

/// Sink for an ordered sequence of equally sized RGB frames.
///
/// Frames are written in the order they are passed. `finish` completes the
/// file; dropping an unfinished encoder releases the output without
/// completing it.
pub trait VideoEncoder {
    /// # Errors
    ///
    /// Returns an error if the frame has the wrong size or cannot be written.
    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), EncodeError>;

    /// # Errors
    ///
    /// Returns an error if the output cannot be completed.
    fn finish(&mut self) -> Result<(), EncodeError>;

    fn frames_written(&self) -> usize;

    fn frame_rate(&self) -> u32;
}

/// Opens the encoder for the container of `path`. The output file is
/// created right away so an unwritable path fails before any frame is drawn.
///
/// # Errors
///
/// Returns an error if the container is unsupported, the frame rate is zero,
/// or the output or the external encoder cannot be opened.
#[tracing::instrument(level = "info")]
pub fn open(
    path: &Path,
    resolution: (u32, u32),
    frame_rate: u32,
) -> Result<Box<dyn VideoEncoder>, EncodeError> {
    if frame_rate == 0 {
        return Err(EncodeError::InvalidFrameRate);
    }
    let container = Container::from_path(path)?;
    info!("Opening {container} encoder");
    Ok(match container {
        Container::Gif => Box::new(GifEncoder::create(path, resolution, frame_rate)?),
        Container::Mp4 | Container::Mkv | Container::Mov | Container::Avi | Container::Webm => {
            Box::new(FfmpegEncoder::spawn(path, container, resolution, frame_rate)?)
        }
    })
}

pub(crate) fn check_frame_size(frame: &RgbImage, expected: (u32, u32)) -> Result<(), EncodeError> {
    let actual = frame.dimensions();
    if actual == expected {
        Ok(())
    } else {
        Err(EncodeError::FrameSizeMismatch { expected, actual })
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn container_from_extension() {
        assert_eq!(
            Container::from_path(Path::new("pendulum.mp4")).unwrap(),
            Container::Mp4
        );
        assert_eq!(
            Container::from_path(Path::new("out/Swing.GIF")).unwrap(),
            Container::Gif
        );
        assert_eq!(
            Container::from_path(Path::new("a.b.webm")).unwrap(),
            Container::Webm
        );
    }

    #[test]
    fn every_container_round_trips_through_its_extension() {
        for container in Container::iter() {
            let path = PathBuf::from(format!("video.{container}"));
            assert_eq!(Container::from_path(&path).unwrap(), container);
        }
    }

    #[test]
    fn unknown_or_missing_extension_is_rejected() {
        assert!(matches!(
            Container::from_path(Path::new("pendulum.txt")),
            Err(EncodeError::UnsupportedContainer { .. })
        ));
        assert!(matches!(
            Container::from_path(Path::new("pendulum")),
            Err(EncodeError::UnsupportedContainer { .. })
        ));
    }

    #[test]
    fn open_rejects_zero_frame_rate() {
        assert!(matches!(
            open(Path::new("never_written.gif"), (10, 10), 0),
            Err(EncodeError::InvalidFrameRate)
        ));
        assert!(!Path::new("never_written.gif").exists());
    }

    #[test]
    fn open_rejects_unknown_container_before_creating_file() {
        assert!(matches!(
            open(Path::new("never_written.txt"), (10, 10), 100),
            Err(EncodeError::UnsupportedContainer { .. })
        ));
        assert!(!Path::new("never_written.txt").exists());
    }

    #[test]
    fn frame_size_is_checked() {
        let frame = RgbImage::new(4, 3);

        assert!(check_frame_size(&frame, (4, 3)).is_ok());
        assert!(matches!(
            check_frame_size(&frame, (3, 4)),
            Err(EncodeError::FrameSizeMismatch {
                expected: (3, 4),
                actual: (4, 3)
            })
        ));
    }
}
