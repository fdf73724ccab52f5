use std::fs::create_dir_all;
use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{EncodeError, PipelineError, Result};
use crate::video::types::{Frame, OutputSpec};

/// Stateful, append-only encoder serializing ordered frames into one video.
///
/// Frames are appended in call order; call order is the sole ordering
/// guarantee. `close` must run exactly once per opened sink, on every exit
/// path, or the container is left truncated. A closed sink is terminal and
/// rejects further writes.
pub trait VideoSink {
    /// Append one frame to the container.
    fn write(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and finalize the container.
    fn close(&mut self) -> Result<()>;
}

/// Video sink backed by an external FFmpeg process
///
/// Raw RGB24 frames are piped to the child's stdin and encoded as they
/// arrive, so memory stays flat regardless of run length. Closing stdin
/// finalizes the container.
pub struct FfmpegSink {
    spec: OutputSpec,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    frames_written: usize,
}

impl FfmpegSink {
    pub fn check_ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Open the sink: create the destination directory, fix the encoder to
    /// the spec's geometry and frame rate, and spawn the encoder process.
    pub fn open(spec: OutputSpec, codec: &str, quality: u8) -> Result<Self> {
        if !Self::check_ffmpeg_available() {
            return Err(EncodeError::InitFailed {
                path: spec.destination.display().to_string(),
                reason: "FFmpeg not found. Please install FFmpeg.".to_string(),
            }
            .into());
        }

        if let Some(parent) = spec.destination.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }

        let args = encode_args(&spec, codec, quality_to_crf(quality));
        debug!("Spawning encoder: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EncodeError::InitFailed {
                path: spec.destination.display().to_string(),
                reason: format!("Failed to spawn FFmpeg process: {}", e),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| EncodeError::InitFailed {
            path: spec.destination.display().to_string(),
            reason: "FFmpeg stdin not available".to_string(),
        })?;

        info!(
            "Opened video sink: {} ({}x{} @ {} fps)",
            spec.destination.display(),
            spec.width,
            spec.height,
            spec.fps
        );

        Ok(Self {
            spec,
            child: Some(child),
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    /// The spec this sink was opened with.
    pub fn spec(&self) -> &OutputSpec {
        &self.spec
    }

    /// Frames appended so far.
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Read whatever FFmpeg printed to stderr, for error reasons.
    fn drain_stderr(child: &mut Child) -> String {
        let mut buffer = String::new();
        if let Some(stderr) = child.stderr.as_mut() {
            let _ = stderr.read_to_string(&mut buffer);
        }
        // Keep only the last non-empty line: earlier output buries the
        // actual failure.
        buffer
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("")
            .trim()
            .to_string()
    }
}

impl VideoSink for FfmpegSink {
    fn write(&mut self, frame: &Frame) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or(EncodeError::Closed)?;

        if frame.width() != self.spec.width || frame.height() != self.spec.height {
            return Err(PipelineError::DimensionMismatch {
                expected_width: self.spec.width,
                expected_height: self.spec.height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            }
            .into());
        }

        stdin
            .write_all(frame.as_raw())
            .map_err(|e| EncodeError::WriteFailed {
                reason: format!("Failed to pipe frame to FFmpeg: {}", e),
            })?;

        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Dropping stdin sends EOF, which tells FFmpeg to finalize.
        let stdin = self.stdin.take().ok_or(EncodeError::Closed)?;
        drop(stdin);

        let mut child = self.child.take().ok_or(EncodeError::Closed)?;
        let status = child.wait().map_err(|e| EncodeError::FinalizeFailed {
            reason: format!("Failed to wait for FFmpeg: {}", e),
        })?;

        if !status.success() {
            let stderr = Self::drain_stderr(&mut child);
            return Err(EncodeError::FinalizeFailed {
                reason: format!("FFmpeg exited with {}: {}", status, stderr),
            }
            .into());
        }

        info!(
            "Finalized video: {} ({} frames)",
            self.spec.destination.display(),
            self.frames_written
        );
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // A sink dropped without close never finalized; reap the child so
        // no encoder process outlives the run.
        if let Some(mut child) = self.child.take() {
            warn!(
                "Video sink for {} dropped without close; killing encoder",
                self.spec.destination.display()
            );
            drop(self.stdin.take());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// FFmpeg argument list for streaming raw RGB24 frames into a container.
fn encode_args(spec: &OutputSpec, codec: &str, crf: u8) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-s".to_string(),
        format!("{}x{}", spec.width, spec.height),
        "-r".to_string(),
        spec.fps.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        codec.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-crf".to_string(),
        crf.to_string(),
        "-y".to_string(),
        spec.destination.display().to_string(),
    ]
}

fn quality_to_crf(quality: u8) -> u8 {
    (51 - ((quality as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_spec() -> OutputSpec {
        OutputSpec {
            destination: PathBuf::from("out/Contoured_clip.mp4"),
            fps: 24,
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn test_encode_args_fix_geometry_and_rate() {
        let args = encode_args(&test_spec(), "libx264", 23);

        let size_pos = args.iter().position(|a| a == "-s").unwrap();
        assert_eq!(args[size_pos + 1], "640x480");

        let rate_pos = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[rate_pos + 1], "24");

        assert_eq!(args.last().unwrap(), "out/Contoured_clip.mp4");
        assert!(args.contains(&"rawvideo".to_string()));
        assert!(args.contains(&"rgb24".to_string()));
    }

    #[test]
    fn test_quality_to_crf_mapping() {
        assert_eq!(quality_to_crf(100), 0);
        assert_eq!(quality_to_crf(0), 51);
        assert!(quality_to_crf(85) < quality_to_crf(50));
    }
}
