//! Recorded Landmark Replay
//!
//! Reads landmark recordings stored as JSON lines, one frame per line:
//!
//! ```text
//! {"t_ms": 0,  "frame": [640, 480], "gaze": [0.51, 0.47], "eyes": [0.011, 0.012]}
//! {"t_ms": 33, "face": false}
//! {"t_ms": 66, "ready": false}
//! {"t_ms": 99, "landmarks": {"left_iris": {"x": 0.4, "y": 0.5}, ...}}
//! ```
//!
//! `t_ms` is the offset from the start of the recording. Blank lines and
//! lines starting with `#` are skipped. A frame without `gaze` (and without
//! `landmarks`) is a face with insufficient landmarks.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::error::{LandmarkError, Result};
use super::{FaceLandmarks, GazeSample, LandmarkFrame, LandmarkProvider};
use crate::geometry::{Point, Size};
use crate::gesture::EyeApertures;

/// Frame size assumed when a record does not carry one
pub const DEFAULT_REPLAY_FRAME_SIZE: Size = Size::new(640, 480);

fn default_true() -> bool {
    true
}

/// One recorded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Milliseconds since the start of the recording
    pub t_ms: u64,

    /// Landmark provider was ready
    #[serde(default = "default_true")]
    pub ready: bool,

    /// A face was detected
    #[serde(default = "default_true")]
    pub face: bool,

    /// Camera frame size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<[u32; 2]>,

    /// Normalized gaze
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaze: Option<[f64; 2]>,

    /// Left and right eyelid apertures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyes: Option<[f64; 2]>,

    /// Raw landmarks, used when gaze/eyes are not given directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<FaceLandmarks>,
}

impl RecordedFrame {
    /// Convert to a landmark frame anchored at `origin`
    pub fn to_frame(&self, origin: Instant, default_size: Size) -> LandmarkFrame {
        if !self.ready {
            return LandmarkFrame::NotReady;
        }
        if !self.face {
            return LandmarkFrame::NoFace;
        }

        let frame = self
            .frame
            .map(|[w, h]| Size::new(w, h))
            .unwrap_or(default_size);
        let timestamp = origin + Duration::from_millis(self.t_ms);

        let sample = match (&self.landmarks, self.gaze) {
            (_, Some([x, y])) => GazeSample {
                gaze: Some(Point::new(x, y)),
                apertures: self.eyes.map(|[left, right]| EyeApertures { left, right }),
                frame,
                timestamp,
            },
            (Some(landmarks), None) => GazeSample::from_landmarks(landmarks, frame, timestamp),
            (None, None) => GazeSample {
                gaze: None,
                apertures: self.eyes.map(|[left, right]| EyeApertures { left, right }),
                frame,
                timestamp,
            },
        };

        LandmarkFrame::Detected(sample)
    }

    fn validate(&self, line: usize) -> Result<()> {
        if let Some([w, h]) = self.frame {
            if w == 0 || h == 0 {
                return Err(LandmarkError::InvalidFrame {
                    line,
                    reason: format!("frame size {}x{} is empty", w, h),
                });
            }
        }
        if let Some([x, y]) = self.gaze {
            if !x.is_finite() || !y.is_finite() {
                return Err(LandmarkError::InvalidFrame {
                    line,
                    reason: "gaze is not finite".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Landmark provider replaying a recording
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    frames: Vec<RecordedFrame>,
    position: usize,
    origin: Instant,
    default_size: Size,
}

impl ReplayProvider {
    /// Create from already-parsed frames
    pub fn from_frames(frames: Vec<RecordedFrame>) -> Self {
        Self {
            frames,
            position: 0,
            origin: Instant::now(),
            default_size: DEFAULT_REPLAY_FRAME_SIZE,
        }
    }

    /// Parse a JSON-lines recording
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        let mut last_t = 0u64;

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let frame: RecordedFrame = serde_json::from_str(trimmed).map_err(|source| {
                LandmarkError::InvalidRecord {
                    line: line_no,
                    source,
                }
            })?;
            frame.validate(line_no)?;

            if frame.t_ms < last_t {
                return Err(LandmarkError::InvalidFrame {
                    line: line_no,
                    reason: format!("timestamp {}ms goes backwards (previous {}ms)", frame.t_ms, last_t),
                });
            }
            last_t = frame.t_ms;
            frames.push(frame);
        }

        debug!("Parsed {} recorded frames", frames.len());
        Ok(Self::from_frames(frames))
    }

    /// Open a recording file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let provider = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded recording {} ({} frames, {:?})",
            path.display(),
            provider.len(),
            provider.duration()
        );
        Ok(provider)
    }

    /// Anchor recorded offsets at a specific instant
    pub fn with_origin(mut self, origin: Instant) -> Self {
        self.origin = origin;
        self
    }

    /// Frame size for records that do not carry one
    pub fn with_default_frame_size(mut self, size: Size) -> Self {
        self.default_size = size;
        self
    }

    /// Number of frames in the recording
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Recording has no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames not yet replayed
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.position
    }

    /// Offset of the last frame
    pub fn duration(&self) -> Duration {
        self.frames
            .last()
            .map(|f| Duration::from_millis(f.t_ms))
            .unwrap_or_default()
    }

    /// Start over from the first frame
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl LandmarkProvider for ReplayProvider {
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        let Some(record) = self.frames.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        Ok(Some(record.to_frame(self.origin, self.default_size)))
    }
}
