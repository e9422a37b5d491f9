use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PoseAlignError, PoseAlignResult};

/// Basic metadata about a source video file.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// Path used for probing and decoding.
    pub source_path: PathBuf,
    /// Displayed frame size in pixels, after applying `rotation`.
    pub canvas: Canvas,
    /// Display rotation in degrees, normalized to `0..360`.
    pub rotation: u32,
    /// Stream frame rate.
    pub fps: Fps,
    /// Frame count reported by the container, when known.
    pub frame_count: Option<u64>,
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Probe source video metadata through `ffprobe`.
///
/// Any failure to run `ffprobe` or to find a usable video stream is an I/O error: the source
/// cannot be opened.
pub fn probe_video(source_path: &Path) -> PoseAlignResult<VideoInfo> {
    if !source_path.is_file() {
        return Err(PoseAlignError::io(format!(
            "cannot open video '{}': no such file",
            source_path.display()
        )));
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| PoseAlignError::io(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(PoseAlignError::io(format!(
            "cannot open video '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(source_path, &out.stdout)
}

pub(crate) fn parse_probe_json(source_path: &Path, json: &[u8]) -> PoseAlignResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        avg_frame_rate: Option<String>,
        nb_frames: Option<String>,
        #[serde(default)]
        side_data_list: Vec<ProbeSideData>,
        tags: Option<ProbeTags>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeSideData {
        rotation: Option<f64>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeTags {
        rotate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| PoseAlignError::io(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            PoseAlignError::io(format!(
                "cannot open video '{}': no video stream found",
                source_path.display()
            ))
        })?;

    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(PoseAlignError::io("missing video width/height from ffprobe"));
    };
    if width == 0 || height == 0 {
        return Err(PoseAlignError::io("video stream has zero width or height"));
    }

    // `r_frame_rate` can be 0/0 for some containers; fall back to the average rate.
    let fps = [stream.r_frame_rate.as_deref(), stream.avg_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|r| Fps::parse_ratio(r).ok())
        .ok_or_else(|| PoseAlignError::io("video stream has no usable frame rate"))?;

    // Display matrix first; older muxers only set the `rotate` tag.
    let rotation = stream
        .side_data_list
        .iter()
        .find_map(|sd| sd.rotation)
        .or_else(|| {
            stream
                .tags
                .as_ref()
                .and_then(|t| t.rotate.as_deref())
                .and_then(|r| r.trim().parse::<f64>().ok())
        })
        .map_or(0, |deg| (deg.round() as i64).rem_euclid(360) as u32);

    // The decoder auto-rotates, so quarter turns swap the frame dimensions.
    let canvas = if rotation % 180 == 90 {
        Canvas {
            width: height,
            height: width,
        }
    } else {
        Canvas { width, height }
    };

    Ok(VideoInfo {
        source_path: source_path.to_path_buf(),
        canvas,
        rotation,
        fps,
        frame_count: stream.nb_frames.as_deref().and_then(|n| n.parse().ok()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
