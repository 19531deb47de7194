#![allow(dead_code)]

pub mod fakes;

use std::sync::Arc;
use std::time::Duration;

use wake_watch::actuator::{ActuatorController, ActuatorTiming};
use wake_watch::detection::{FaceLandmarks, Point2D};
use wake_watch::replay::LandmarkTrace;

use fakes::RecordingChannel;

pub const CLOSED_RATIO: f64 = 0.1;
pub const OPEN_RATIO: f64 = 0.4;

/// 6 个眼部关键点，竖直/水平间距比为 `ratio`
pub fn eye_points(origin_x: f64, origin_y: f64, ratio: f64) -> Vec<Point2D> {
    let w = 30.0;
    let h = w * ratio;
    vec![
        Point2D::new(origin_x, origin_y),
        Point2D::new(origin_x + 10.0, origin_y - h / 2.0),
        Point2D::new(origin_x + 20.0, origin_y - h / 2.0),
        Point2D::new(origin_x + w, origin_y),
        Point2D::new(origin_x + 20.0, origin_y + h / 2.0),
        Point2D::new(origin_x + 10.0, origin_y + h / 2.0),
    ]
}

/// 68 点人脸，右眼 36..42、左眼 42..48 的纵横比均为 `ratio`
pub fn face(ratio: f64) -> FaceLandmarks {
    let mut points: Vec<Point2D> = (0..36)
        .map(|i| Point2D::new(100.0 + i as f64, 200.0))
        .collect();
    points.extend(eye_points(150.0, 120.0, ratio));
    points.extend(eye_points(250.0, 120.0, ratio));
    points.extend((48..68).map(|i| Point2D::new(100.0 + i as f64, 260.0)));
    FaceLandmarks::new(points)
}

/// true → 闭眼人脸，false → 睁眼人脸
pub fn trace_from_signals(signals: &[bool]) -> Arc<LandmarkTrace> {
    let frames = signals
        .iter()
        .map(|&drowsy| vec![face(if drowsy { CLOSED_RATIO } else { OPEN_RATIO })])
        .collect();
    Arc::new(LandmarkTrace::from_frames(frames))
}

pub fn timing() -> ActuatorTiming {
    ActuatorTiming {
        settle: Duration::from_secs(2),
        alert_pulse: Duration::from_millis(750),
    }
}

pub async fn started_actuator(channel: RecordingChannel) -> ActuatorController<RecordingChannel> {
    ActuatorController::startup(channel, timing())
        .await
        .expect("actuator startup")
}
