//! Turning a [`Timeline`] into a video file through an external encoder.

use crate::timeline::{Timeline, DEFAULT_FRAME_DURATION};
use crate::{ReelError, Result};
use std::ffi::OsString;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub frame_duration_secs: f64,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Kill the encoder and fail once this elapses. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_duration_secs: DEFAULT_FRAME_DURATION,
            width: 720,
            height: 1280,
            fps: 24,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            timeout: None,
        }
    }
}

/// Inputs for one encoder run.
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub manifest: PathBuf,
    /// Only set when the audio file exists.
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
}

/// An external video encoder consuming a concat manifest.
pub trait Encoder: Send + Sync {
    /// Produce `job.output`; failures carry the encoder's diagnostics.
    fn encode(&self, job: &EncodeJob, config: &RenderConfig) -> impl Future<Output = Result<()>> + Send;
}

/// Runs the `ffmpeg` binary as a subprocess.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl FfmpegEncoder {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(job: &EncodeJob, config: &RenderConfig) -> Vec<OsString> {
        let (w, h) = (config.width, config.height);
        let mut args: Vec<OsString> = ["-y", "-f", "concat", "-safe", "0", "-i"].iter().map(OsString::from).collect();
        args.push(job.manifest.clone().into_os_string());
        if let Some(audio) = &job.audio {
            args.push("-i".into());
            args.push(audio.clone().into_os_string());
        }
        args.extend(
            [
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
                "-vf".to_string(),
                format!("scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"),
                "-r".to_string(),
                config.fps.to_string(),
                "-movflags".to_string(),
                "+faststart".to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        if job.audio.is_some() {
            args.extend(
                ["-shortest", "-c:a", config.audio_codec.as_str(), "-b:a", config.audio_bitrate.as_str()]
                    .iter()
                    .map(OsString::from),
            );
        }
        args.push(job.output.clone().into_os_string());
        args
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Encoder for FfmpegEncoder {
    async fn encode(&self, job: &EncodeJob, config: &RenderConfig) -> Result<()> {
        let args = Self::args(job, config);
        tracing::info!(program = %self.program.display(), ?args, "encoder started");
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ReelError::render(format!("failed to start {}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(status = %output.status, "encoder failed");
            return Err(ReelError::render(format!("{}: {stderr}", output.status)));
        }
        tracing::info!(output = %job.output.display(), "encoder finished");
        Ok(())
    }
}

/// One-shot image sequence to video generation.
pub struct VideoGenerator<E> {
    encoder: E,
    config: RenderConfig,
}

impl<E: Encoder> VideoGenerator<E> {
    pub fn new(encoder: E, config: RenderConfig) -> Self {
        Self { encoder, config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Render `images` (and `audio`, if it exists on disk) into `output`.
    ///
    /// The concat manifest lives next to `output` under a unique name and is
    /// removed on every exit path, including encoder failure and timeout.
    pub async fn build<P: AsRef<Path>>(&self, images: &[P], audio: Option<&Path>, output: &Path) -> Result<PathBuf> {
        let timeline = Timeline::build(images, audio, self.config.frame_duration_secs)?;
        let manifest_text = timeline.manifest()?;

        let out_dir = match output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|e| ReelError::render(format!("cannot create {}: {e}", out_dir.display())))?;

        let manifest = tokio::task::spawn_blocking(move || write_manifest(&out_dir, &manifest_text))
            .await
            .map_err(|e| ReelError::render(format!("manifest writer panicked: {e}")))??;
        tracing::debug!(path = %manifest.path().display(), entries = timeline.frames().len(), "manifest written");

        let audio = match timeline.audio() {
            Some(path) => {
                if tokio::fs::try_exists(path).await.unwrap_or(false) {
                    Some(path.to_path_buf())
                } else {
                    tracing::warn!(audio = %path.display(), "audio track missing, rendering silent video");
                    None
                }
            }
            None => None,
        };
        let job = EncodeJob { manifest: manifest.path().to_path_buf(), audio, output: output.to_path_buf() };

        let run = self.encoder.encode(&job, &self.config);
        let outcome = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => result,
                Err(_) => Err(ReelError::render(format!("encoder timed out after {}s", limit.as_secs_f64()))),
            },
            None => run.await,
        };

        if let Err(e) = manifest.close() {
            tracing::warn!(error = %e, "failed to remove concat manifest");
        }
        outcome?;
        Ok(job.output)
    }
}

fn write_manifest(dir: &Path, text: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("concat_")
        .suffix(".txt")
        .tempfile_in(dir)
        .map_err(|e| ReelError::render(format!("cannot create manifest in {}: {e}", dir.display())))?;
    file.write_all(text.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| ReelError::render(format!("cannot write manifest: {e}")))?;
    Ok(file)
}
