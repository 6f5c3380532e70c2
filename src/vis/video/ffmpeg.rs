use std::{
    fs::File,
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
    thread::{self, JoinHandle},
};

use image::RgbImage;
use tracing::{debug, info, warn};

use super::{check_frame_size, Container, EncodeError, VideoEncoder};

pub const FFMPEG: &str = "ffmpeg";

impl Container {
    /// Codec arguments for `ffmpeg`, `None` for containers written in
    /// process. Odd frame sizes are padded by one pixel because 4:2:0 chroma
    /// subsampling needs even dimensions.
    #[must_use]
    pub const fn codec_args(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Gif => None,
            Self::Webm => Some(&[
                "-c:v",
                "libvpx-vp9",
                "-pix_fmt",
                "yuv420p",
                "-vf",
                "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            ]),
            Self::Mp4 | Self::Mkv | Self::Mov | Self::Avi => Some(&[
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-vf",
                "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            ]),
        }
    }
}

/// Reads `pipe` to the end on its own thread so the child never blocks on a
/// full pipe.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Err(error) = pipe.read_to_end(&mut buffer) {
            debug!("Stopped reading {FFMPEG} stderr: {error}");
        }
        buffer
    })
}

/// Pipes raw RGB frames into an `ffmpeg` child process.
///
/// The child's stdin is closed and the process reaped in `finish`, or killed
/// and reaped on drop if encoding stops early.
pub struct FfmpegEncoder {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<Vec<u8>>>,
    path: PathBuf,
    resolution: (u32, u32),
    frame_rate: u32,
    frames_written: usize,
}

impl FfmpegEncoder {
    /// Truncates `path` and starts `ffmpeg` writing `container` to it.
    ///
    /// # Errors
    ///
    /// Returns an error if `container` is not encoded by `ffmpeg`, if `path`
    /// cannot be created or if `ffmpeg` cannot be started.
    #[tracing::instrument(level = "debug")]
    pub fn spawn(
        path: &Path,
        container: Container,
        resolution: (u32, u32),
        frame_rate: u32,
    ) -> Result<Self, EncodeError> {
        if frame_rate == 0 {
            return Err(EncodeError::InvalidFrameRate);
        }
        let codec_args = container
            .codec_args()
            .ok_or_else(|| EncodeError::UnsupportedContainer {
                path: path.to_path_buf(),
            })?;
        File::create(path).map_err(|source| EncodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut child = Command::new(FFMPEG)
            .args(["-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-video_size")
            .arg(format!("{}x{}", resolution.0, resolution.1))
            .arg("-framerate")
            .arg(frame_rate.to_string())
            .args(["-i", "-"])
            .args(codec_args)
            .arg("-r")
            .arg(frame_rate.to_string())
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EncodeError::EncoderUnavailable {
                program: FFMPEG.to_string(),
                source,
            })?;
        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(drain);
        debug!("Started {FFMPEG} for {}", path.display());

        Ok(Self {
            child: Some(child),
            stdin,
            stderr,
            path: path.to_path_buf(),
            resolution,
            frame_rate,
            frames_written: 0,
        })
    }

    /// Closes stdin, waits for the child and turns a failed exit into an
    /// error carrying its stderr.
    fn wait(&mut self) -> Result<(), EncodeError> {
        drop(self.stdin.take());
        let mut child = self.child.take().ok_or(EncodeError::Finished)?;
        let status = child.wait()?;
        let stderr = self.collect_stderr();
        if status.success() {
            Ok(())
        } else {
            Err(EncodeError::EncoderFailed {
                program: FFMPEG.to_string(),
                status,
                stderr,
            })
        }
    }

    fn collect_stderr(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|reader| reader.join().ok())
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
            .unwrap_or_default()
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), EncodeError> {
        check_frame_size(frame, self.resolution)?;
        let stdin = self.stdin.as_mut().ok_or(EncodeError::Finished)?;
        match stdin.write_all(frame.as_raw()) {
            Ok(()) => {
                self.frames_written += 1;
                Ok(())
            }
            // ffmpeg exited early, its stderr says why.
            Err(error) if error.kind() == ErrorKind::BrokenPipe => {
                self.wait()?;
                Err(error.into())
            }
            Err(error) => Err(error.into()),
        }
    }

    fn finish(&mut self) -> Result<(), EncodeError> {
        if self.child.is_none() {
            return Err(EncodeError::Finished);
        }
        if self.frames_written == 0 {
            return Err(EncodeError::NoFrames);
        }
        if let Some(stdin) = self.stdin.as_mut() {
            stdin.flush()?;
        }
        self.wait()?;
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

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            warn!("Stopping unfinished {FFMPEG} encode of {}", self.path.display());
            if let Err(error) = child.kill() {
                debug!("Could not kill {FFMPEG}: {error}");
            }
            if let Err(error) = child.wait() {
                debug!("Could not reap {FFMPEG}: {error}");
            }
        }
        self.collect_stderr();
    }
}
