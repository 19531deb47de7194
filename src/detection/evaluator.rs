//! 单帧困倦判定
//!
//! 对每张检测到的人脸：切出左右眼 → 分别计算 EAR → 取平均 → 与阈值比较。
//! 任意一张人脸低于阈值即判定该帧困倦（首个命中即返回）。
//! 未检测到人脸、检测失败、关键点不足都按"未困倦"处理，不向上抛错。

use crate::config::DetectionConfig;
use crate::detection::ear::calculate_ear;
use crate::detection::frame::{AnnotatedFrame, Frame};
use crate::detection::geometry::FaceLandmarks;
use crate::detection::landmarks::{EyeRanges, LandmarkDetector, LandmarkError};

#[derive(Debug, Clone)]
pub struct FrameEvaluation {
    pub is_drowsy: bool,
    pub faces_detected: usize,
    /// 最后一张完成评估的人脸的平均 EAR
    pub ear: Option<f64>,
    pub annotated: AnnotatedFrame,
}

#[derive(Debug, Clone)]
pub struct FrameEvaluator {
    eye_ranges: EyeRanges,
    ear_threshold: f64,
}

impl FrameEvaluator {
    pub fn new(eye_ranges: EyeRanges, ear_threshold: f64) -> Self {
        Self {
            eye_ranges,
            ear_threshold,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            EyeRanges {
                left: config.left_eye.clone(),
                right: config.right_eye.clone(),
            },
            config.ear_threshold,
        )
    }

    pub fn ear_threshold(&self) -> f64 {
        self.ear_threshold
    }

    pub fn evaluate<D>(&self, frame: Frame, detector: &D) -> FrameEvaluation
    where
        D: LandmarkDetector + ?Sized,
    {
        let gray = frame.to_gray();
        let mut evaluation = FrameEvaluation {
            is_drowsy: false,
            faces_detected: 0,
            ear: None,
            annotated: AnnotatedFrame {
                frame,
                contours: Vec::new(),
            },
        };

        let regions = match detector.detect_faces(&gray) {
            Ok(regions) => regions,
            Err(e) => {
                tracing::warn!(frame = gray.frame_index, error = %e, "Face detection failed");
                return evaluation;
            }
        };
        evaluation.faces_detected = regions.len();

        for region in &regions {
            let landmarks = match detector.predict_landmarks(&gray, region) {
                Ok(landmarks) => landmarks,
                Err(e) => {
                    tracing::warn!(frame = gray.frame_index, error = %e, "Landmark prediction failed");
                    continue;
                }
            };

            let ear = match self.face_ear(&landmarks, &mut evaluation.annotated) {
                Ok(ear) => ear,
                Err(e) => {
                    tracing::warn!(frame = gray.frame_index, error = %e, "Skipping face");
                    continue;
                }
            };

            tracing::debug!(frame = gray.frame_index, slot = region.slot, ear, "EAR");
            evaluation.ear = Some(ear);

            if ear < self.ear_threshold {
                evaluation.is_drowsy = true;
                return evaluation;
            }
        }

        evaluation
    }

    fn face_ear(
        &self,
        landmarks: &FaceLandmarks,
        annotated: &mut AnnotatedFrame,
    ) -> Result<f64, LandmarkError> {
        let left = landmarks.eye(self.eye_ranges.left.clone())?;
        let right = landmarks.eye(self.eye_ranges.right.clone())?;

        annotated.contours.push(left.contour());
        annotated.contours.push(right.contour());

        Ok((calculate_ear(&left) + calculate_ear(&right)) / 2.0)
    }
}
