use std::collections::VecDeque;
use std::io::{BufReader, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use image::{Rgba, RgbaImage};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PoseAlignError, PoseAlignResult};
use crate::media::probe::{VideoInfo, probe_video};

/// Sequential decoder of straight-alpha RGBA8 frames.
///
/// `next_frame` returns `Ok(None)` once the stream is exhausted; that is the normal end of a video,
/// not an error.
pub trait FrameSource {
    /// Frame size of every decoded frame.
    fn canvas(&self) -> Canvas;
    /// Stream frame rate.
    fn fps(&self) -> Fps;
    /// Decode the next frame in presentation order.
    fn next_frame(&mut self) -> PoseAlignResult<Option<RgbaImage>>;
}

impl<T: FrameSource + ?Sized> FrameSource for &mut T {
    fn canvas(&self) -> Canvas {
        (**self).canvas()
    }

    fn fps(&self) -> Fps {
        (**self).fps()
    }

    fn next_frame(&mut self) -> PoseAlignResult<Option<RgbaImage>> {
        (**self).next_frame()
    }
}

/// Streams raw frames out of the system `ffmpeg` binary.
///
/// The whole video is decoded by one long-lived `ffmpeg` process, so memory stays bounded by a
/// single frame regardless of video length.
pub struct FfmpegFrameSource {
    info: VideoInfo,
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    decoded: u64,
}

impl FfmpegFrameSource {
    /// Probe `path` and start decoding it.
    ///
    /// Fails with [`PoseAlignError::Io`] when the video cannot be opened.
    pub fn open(path: &Path) -> PoseAlignResult<Self> {
        let info = probe_video(path)?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(&info.source_path)
            .args([
                "-map", "0:v:0", "-an", "-sn", "-vsync", "0", "-f", "rawvideo", "-pix_fmt",
                "rgba", "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PoseAlignError::io(format!(
                    "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PoseAlignError::io("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| PoseAlignError::io("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::debug!(
            path = %info.source_path.display(),
            width = info.canvas.width,
            height = info.canvas.height,
            rotation = info.rotation,
            fps = info.fps.as_f64(),
            "opened video"
        );

        Ok(Self {
            info,
            child: Some(child),
            stdout: Some(BufReader::new(stdout)),
            stderr_drain: Some(stderr_drain),
            decoded: 0,
        })
    }

    /// Probe metadata of the open video.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Frames decoded so far.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    fn finish(&mut self) {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return;
        };
        let status = child.wait();
        let stderr = self
            .stderr_drain
            .take()
            .and_then(|h| h.join().ok())
            .and_then(|r| r.ok())
            .unwrap_or_default();
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => tracing::warn!(
                path = %self.info.source_path.display(),
                decoded = self.decoded,
                status = %s,
                stderr = %String::from_utf8_lossy(&stderr).trim(),
                "ffmpeg decode ended early"
            ),
            Err(e) => tracing::warn!(error = %e, "failed to wait for ffmpeg decoder"),
        }
    }
}

impl FrameSource for FfmpegFrameSource {
    fn canvas(&self) -> Canvas {
        self.info.canvas
    }

    fn fps(&self) -> Fps {
        self.info.fps
    }

    fn next_frame(&mut self) -> PoseAlignResult<Option<RgbaImage>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.info.canvas.rgba_len()];
        match stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finish();
                return Ok(None);
            }
            Err(e) => {
                return Err(PoseAlignError::io(format!(
                    "failed to read frame {} of '{}': {e}",
                    self.decoded,
                    self.info.source_path.display()
                )));
            }
        }

        self.decoded += 1;
        let Canvas { width, height } = self.info.canvas;
        RgbaImage::from_raw(width, height, buf)
            .map(Some)
            .ok_or_else(|| PoseAlignError::io("decoded frame has unexpected size"))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Frames held in memory, for tests and pre-decoded clips.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    canvas: Canvas,
    fps: Fps,
    frames: VecDeque<RgbaImage>,
}

impl InMemorySource {
    /// Build a source from frames that all share `canvas`'s size.
    pub fn new(canvas: Canvas, fps: Fps, frames: Vec<RgbaImage>) -> PoseAlignResult<Self> {
        if let Some((i, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.dimensions() != (canvas.width, canvas.height))
        {
            return Err(PoseAlignError::validation(format!(
                "frame {i} is {}x{}, expected {}x{}",
                f.width(),
                f.height(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(Self {
            canvas,
            fps,
            frames: frames.into(),
        })
    }

    /// `count` opaque black frames.
    pub fn blank(canvas: Canvas, fps: Fps, count: usize) -> Self {
        let frame = RgbaImage::from_pixel(canvas.width, canvas.height, Rgba([0, 0, 0, 255]));
        Self {
            canvas,
            fps,
            frames: std::iter::repeat_n(frame, count).collect(),
        }
    }

    /// Frames not yet returned.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for InMemorySource {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn next_frame(&mut self) -> PoseAlignResult<Option<RgbaImage>> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
