//! 困倦检测
//!
//! 单帧 EAR 计算 → 帧评估（是否困倦）→ 连续帧去抖状态机。
//!
//! ## 模块
//! - `geometry`: 关键点与眼部轮廓
//! - `ear`: EAR (Eye Aspect Ratio) 眼部纵横比计算
//! - `frame`: 视频帧与灰度图
//! - `landmarks`: 面部关键点检测接口
//! - `evaluator`: 单帧困倦判定
//! - `state_machine`: 困倦确认状态机

pub mod ear;
pub mod evaluator;
pub mod frame;
pub mod geometry;
pub mod landmarks;
pub mod state_machine;

pub use ear::calculate_ear;
pub use evaluator::{FrameEvaluation, FrameEvaluator};
pub use frame::{AnnotatedFrame, Frame, GrayImage};
pub use geometry::{EyeLandmarks, FaceLandmarks, Point2D};
pub use landmarks::{EyeRanges, FaceRegion, LandmarkDetector, LandmarkError};
pub use state_machine::{Action, DrowsinessState, DrowsinessStateMachine, Phase};
