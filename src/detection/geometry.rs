use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::constants::EYE_LANDMARK_COUNT;
use crate::detection::landmarks::LandmarkError;

/// 图像坐标系中的点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

/// 单眼 6 个关键点
///
/// 顺序固定：外眼角、上眼睑两点、内眼角、下眼睑两点。
/// 顺序决定了 EAR 分子/分母使用哪些点对。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeLandmarks([Point2D; EYE_LANDMARK_COUNT]);

impl EyeLandmarks {
    pub const fn new(points: [Point2D; EYE_LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point2D; EYE_LANDMARK_COUNT] {
        &self.0
    }

    /// Convex hull of the eye points, counter-clockwise, used for contour overlays.
    pub fn contour(&self) -> Vec<Point2D> {
        convex_hull(&self.0)
    }
}

impl TryFrom<&[Point2D]> for EyeLandmarks {
    type Error = LandmarkError;

    fn try_from(points: &[Point2D]) -> Result<Self, Self::Error> {
        let points: [Point2D; EYE_LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| LandmarkError::EyePointCount {
                    expected: EYE_LANDMARK_COUNT,
                    actual: points.len(),
                })?;
        Ok(Self(points))
    }
}

/// 一张人脸在一帧中的全部关键点（如 68 点）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks(Vec<Point2D>);

impl FaceLandmarks {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.0
    }

    /// 按区间切出一只眼睛的关键点
    pub fn eye(&self, range: Range<usize>) -> Result<EyeLandmarks, LandmarkError> {
        let slice = self
            .0
            .get(range.clone())
            .ok_or(LandmarkError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.0.len(),
            })?;
        EyeLandmarks::try_from(slice)
    }
}

fn cross(o: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Andrew's monotone chain.
fn convex_hull(points: &[Point2D]) -> Vec<Point2D> {
    let mut sorted: Vec<Point2D> = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point2D> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2D> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
