//! Landmark trace replay.
//!
//! A trace is a JSON-lines file, one line per frame:
//! `{"faces": [[[x, y], ...], ...]}`. Blank lines are ignored.
//! `TraceFrameSource` yields one pixel-less frame per line and
//! `TraceDetector` answers landmark queries for the frame with the same index.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::detection::{FaceLandmarks, FaceRegion, Frame, GrayImage, LandmarkDetector, LandmarkError};
use crate::session::{CaptureError, FrameSource};

#[derive(Debug, Clone, Default, Deserialize)]
struct TraceLine {
    #[serde(default)]
    faces: Vec<FaceLandmarks>,
}

#[derive(Debug, Clone, Default)]
pub struct LandmarkTrace {
    frames: Vec<Vec<FaceLandmarks>>,
}

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("failed to read landmark trace {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed landmark trace at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl LandmarkTrace {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TraceError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let trace = Self::parse(&raw)?;
        tracing::info!(path = %path.display(), frames = trace.len(), "Landmark trace loaded");
        Ok(trace)
    }

    pub fn parse(raw: &str) -> Result<Self, TraceError> {
        let mut frames = Vec::new();
        for (i, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parsed: TraceLine = serde_json::from_str(line)
                .map_err(|source| TraceError::Parse { line: i + 1, source })?;
            frames.push(parsed.faces);
        }
        Ok(Self { frames })
    }

    pub fn from_frames(frames: Vec<Vec<FaceLandmarks>>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn faces(&self, frame_index: u64) -> &[FaceLandmarks] {
        usize::try_from(frame_index)
            .ok()
            .and_then(|i| self.frames.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub struct TraceFrameSource {
    trace: Arc<LandmarkTrace>,
    next: u64,
}

impl TraceFrameSource {
    pub fn new(trace: Arc<LandmarkTrace>) -> Self {
        Self { trace, next: 0 }
    }
}

impl FrameSource for TraceFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.next >= self.trace.len() as u64 {
            return Ok(None);
        }
        let frame = Frame::empty(self.next);
        self.next += 1;
        Ok(Some(frame))
    }
}

pub struct TraceDetector {
    trace: Arc<LandmarkTrace>,
}

impl TraceDetector {
    pub fn new(trace: Arc<LandmarkTrace>) -> Self {
        Self { trace }
    }
}

impl LandmarkDetector for TraceDetector {
    fn detect_faces(&self, gray: &GrayImage) -> Result<Vec<FaceRegion>, LandmarkError> {
        let regions = self
            .trace
            .faces(gray.frame_index)
            .iter()
            .enumerate()
            .map(|(slot, face)| bounding_region(face, slot))
            .collect();
        Ok(regions)
    }

    fn predict_landmarks(
        &self,
        gray: &GrayImage,
        region: &FaceRegion,
    ) -> Result<FaceLandmarks, LandmarkError> {
        self.trace
            .faces(gray.frame_index)
            .get(region.slot)
            .cloned()
            .ok_or_else(|| {
                LandmarkError::Prediction(format!(
                    "no face {} recorded for frame {}",
                    region.slot, gray.frame_index
                ))
            })
    }
}

fn bounding_region(face: &FaceLandmarks, slot: usize) -> FaceRegion {
    if face.is_empty() {
        return FaceRegion {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
            slot,
        };
    }

    let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
    let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
    for p in face.points() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    FaceRegion {
        left: min_x.floor() as i32,
        top: min_y.floor() as i32,
        right: max_x.ceil() as i32,
        bottom: max_y.ceil() as i32,
        slot,
    }
}
