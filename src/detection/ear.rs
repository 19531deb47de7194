//! EAR (Eye Aspect Ratio) 计算
//!
//! 公式: EAR = (|p1-p5| + |p2-p4|) / (2 * |p0-p3|)
//! - p0, p3: 眼角点（水平方向）
//! - p1, p2: 上眼睑点
//! - p4, p5: 下眼睑点
//!
//! 值越小眼睛越闭合，睁眼时通常在 0.25 ~ 0.5 之间。

use crate::detection::geometry::EyeLandmarks;

/// 计算单眼 EAR
///
/// 眼角点重合（水平距离为 0）时比值无定义，返回 `f64::INFINITY`，
/// 与任何阈值比较都判定为"未闭眼"。
pub fn calculate_ear(eye: &EyeLandmarks) -> f64 {
    let p = eye.points();
    let vertical1 = p[1].distance(&p[5]);
    let vertical2 = p[2].distance(&p[4]);
    let horizontal = p[0].distance(&p[3]);

    if horizontal <= f64::EPSILON {
        return f64::INFINITY;
    }

    (vertical1 + vertical2) / (2.0 * horizontal)
}
