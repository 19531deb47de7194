use std::ops::Range;

use crate::detection::frame::GrayImage;
use crate::detection::geometry::FaceLandmarks;

/// 检测到的人脸区域
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    /// 检测器内部用于定位该人脸的序号
    pub slot: usize,
}

/// 外部人脸/关键点检测能力
///
/// 给定灰度图返回零个或多个人脸区域，再对每个区域预测关键点。
pub trait LandmarkDetector {
    fn detect_faces(&self, gray: &GrayImage) -> Result<Vec<FaceRegion>, LandmarkError>;

    fn predict_landmarks(
        &self,
        gray: &GrayImage,
        region: &FaceRegion,
    ) -> Result<FaceLandmarks, LandmarkError>;
}

/// 左右眼在人脸关键点序列中的区间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EyeRanges {
    pub left: Range<usize>,
    pub right: Range<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum LandmarkError {
    #[error("face detection failed: {0}")]
    Detection(String),
    #[error("landmark prediction failed: {0}")]
    Prediction(String),
    #[error("eye range {start}..{end} out of bounds for {len} landmarks")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error("eye needs {expected} landmarks, got {actual}")]
    EyePointCount { expected: usize, actual: usize },
}
