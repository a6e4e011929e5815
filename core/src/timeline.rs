//! Frame timeline for still-image videos and its concat manifest.
//!
//! The manifest lists each image once with its display duration, then the last
//! image again without a duration. Concat-based encoders drop the declared
//! duration of the final entry, so without the repeat the last image would only
//! flash on screen.

use crate::{ReelError, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const DEFAULT_FRAME_DURATION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    pub path: PathBuf,
    /// Seconds on screen; `None` lets the stream end terminate the frame.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    frames: Vec<ImageFrame>,
    audio: Option<PathBuf>,
}

impl Timeline {
    pub fn build<P: AsRef<Path>>(images: &[P], audio: Option<&Path>, frame_duration: f64) -> Result<Self> {
        if images.is_empty() {
            return Err(ReelError::InvalidInput("no images provided for video generation".into()));
        }
        if !frame_duration.is_finite() || frame_duration <= 0.0 {
            return Err(ReelError::InvalidInput(format!("frame duration must be positive, got {frame_duration}")));
        }

        let mut frames: Vec<ImageFrame> = images
            .iter()
            .map(|p| ImageFrame { path: p.as_ref().to_path_buf(), duration: Some(frame_duration) })
            .collect();
        let last = images[images.len() - 1].as_ref().to_path_buf();
        frames.push(ImageFrame { path: last, duration: None });

        Ok(Self { frames, audio: audio.map(Path::to_path_buf) })
    }

    pub fn frames(&self) -> &[ImageFrame] {
        &self.frames
    }

    pub fn audio(&self) -> Option<&Path> {
        self.audio.as_deref()
    }

    /// Seconds of video the timed frames account for.
    pub fn total_duration(&self) -> f64 {
        self.frames.iter().filter_map(|f| f.duration).sum()
    }

    /// Render the concat manifest: `file '<path>'` lines, each followed by
    /// `duration <seconds>` when the frame has one.
    pub fn manifest(&self) -> Result<String> {
        let mut out = String::new();
        for frame in &self.frames {
            let _ = writeln!(out, "file '{}'", manifest_path(&frame.path)?);
            if let Some(duration) = frame.duration {
                let _ = writeln!(out, "duration {duration}");
            }
        }
        Ok(out)
    }
}

/// Absolute path with forward slashes and single quotes escaped for a
/// single-quoted manifest string.
pub fn manifest_path(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)
        .map_err(|e| ReelError::InvalidInput(format!("cannot resolve {}: {e}", path.display())))?;
    let text = absolute
        .to_str()
        .ok_or_else(|| ReelError::InvalidInput(format!("{} is not valid UTF-8", absolute.display())))?;
    Ok(text.replace('\\', "/").replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_list_is_invalid() {
        let images: [&str; 0] = [];
        let err = Timeline::build(&images, None, DEFAULT_FRAME_DURATION).unwrap_err();
        assert!(matches!(err, ReelError::InvalidInput(_)));
    }

    #[test]
    fn non_positive_duration_is_invalid() {
        assert!(Timeline::build(&["/a.png"], None, 0.0).is_err());
        assert!(Timeline::build(&["/a.png"], None, f64::NAN).is_err());
    }

    #[test]
    fn last_frame_is_repeated_without_duration() {
        let t = Timeline::build(&["/img/a.png", "/img/b.png"], None, 0.5).unwrap();
        let durations: Vec<Option<f64>> = t.frames().iter().map(|f| f.duration).collect();
        assert_eq!(durations, vec![Some(0.5), Some(0.5), None]);
        assert_eq!(t.frames()[2].path, PathBuf::from("/img/b.png"));
        assert_eq!(t.total_duration(), 1.0);
    }

    #[test]
    fn single_image_still_gets_a_repeat() {
        let t = Timeline::build(&["/img/only.png"], Some(Path::new("/a.mp3")), 0.5).unwrap();
        assert_eq!(t.frames().len(), 2);
        assert_eq!(t.audio(), Some(Path::new("/a.mp3")));
    }

    #[cfg(unix)]
    #[test]
    fn manifest_escapes_quotes() {
        let t = Timeline::build(&["/img/it's.png"], None, 0.5).unwrap();
        assert_eq!(t.manifest().unwrap(), "file '/img/it'\\''s.png'\nduration 0.5\nfile '/img/it'\\''s.png'\n");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/img/\xff.png"));
        assert!(matches!(manifest_path(path), Err(ReelError::InvalidInput(_))));
        let t = Timeline::build(&[path], None, 0.5).unwrap();
        assert!(matches!(t.manifest(), Err(ReelError::InvalidInput(_))));
    }

    #[test]
    fn relative_paths_become_absolute() {
        let resolved = manifest_path(Path::new("frames/a.png")).unwrap();
        assert!(resolved.ends_with("frames/a.png"));
        assert!(Path::new(&resolved).is_absolute() || resolved.contains(":/"));
    }
}
