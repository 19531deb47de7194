//! 困倦确认状态机
//!
//! Awake → Accumulating → ConfirmedDrowsy
//!
//! 上升沿去抖：需要连续 `frame_check` 帧困倦才确认；
//! 下降沿不去抖：任意一帧非困倦（包括未检测到人脸）立即清零并回到 Awake。
//! 确认后每一帧困倦都会再次触发升级（电平触发）。

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Awake,
    Accumulating,
    ConfirmedDrowsy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DrowsinessState {
    pub consecutive_drowsy_frames: u32,
    pub is_alerting: bool,
}

/// 每帧更新后调用方需要执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 困倦累积中，尚未确认
    Hold,
    /// 已确认困倦，执行升级序列；`first` 表示本帧刚跨过确认阈值
    Escalate { first: bool },
    /// 非困倦帧，执行器恢复 RUN
    Resume,
}

#[derive(Debug, Clone)]
pub struct DrowsinessStateMachine {
    frame_check: u32,
    state: DrowsinessState,
}

impl DrowsinessStateMachine {
    pub fn new(frame_check: u32) -> Self {
        Self {
            frame_check: frame_check.max(1),
            state: DrowsinessState::default(),
        }
    }

    pub fn frame_check(&self) -> u32 {
        self.frame_check
    }

    pub fn state(&self) -> DrowsinessState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state.consecutive_drowsy_frames {
            0 => Phase::Awake,
            n if n < self.frame_check => Phase::Accumulating,
            _ => Phase::ConfirmedDrowsy,
        }
    }

    pub fn update(&mut self, is_drowsy: bool) -> Action {
        if !is_drowsy {
            if self.state.is_alerting {
                tracing::info!(
                    frames = self.state.consecutive_drowsy_frames,
                    "Driver recovered, back to awake"
                );
            }
            self.reset();
            return Action::Resume;
        }

        self.state.consecutive_drowsy_frames = self.state.consecutive_drowsy_frames.saturating_add(1);
        if self.state.consecutive_drowsy_frames < self.frame_check {
            return Action::Hold;
        }

        let first = !self.state.is_alerting;
        if first {
            tracing::info!(
                frames = self.state.consecutive_drowsy_frames,
                "Drowsiness confirmed"
            );
        }
        self.state.is_alerting = true;
        Action::Escalate { first }
    }

    pub fn reset(&mut self) {
        self.state = DrowsinessState::default();
    }
}
