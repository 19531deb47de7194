//! 监测会话主循环
//!
//! 每次迭代：取一帧 → 缩放 → 单帧判定 → 状态机更新 →（按需）升级序列 / 恢复 RUN → 显示。
//! 单线程顺序执行，执行器命令严格按程序顺序发出。

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::actuator::{ActuatorCommand, ActuatorController, ActuatorError, CommandChannel};
use crate::config::DetectionConfig;
use crate::detection::{
    Action, AnnotatedFrame, DrowsinessStateMachine, Frame, FrameEvaluator, LandmarkDetector,
};
use crate::escalation::{EscalationEvent, EscalationSequencer};
use crate::replay::TraceError;
use crate::services::{GeoError, GeoLocator, SmsError, SmsSender};

/// 视频帧来源
pub trait FrameSource {
    /// `Ok(None)` 表示流正常结束
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    Quit,
}

/// 显示端；返回 `Quit` 表示用户请求退出
pub trait FrameSink {
    fn present(&mut self, frame: &AnnotatedFrame) -> SinkControl;
}

/// Discards frames.
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &AnnotatedFrame) -> SinkControl {
        SinkControl::Continue
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("could not read frame: {0}")]
    Read(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Actuator(#[from] ActuatorError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Geo(#[from] GeoError),
    #[error(transparent)]
    Sms(#[from] SmsError),
    #[error("no frame source configured (set LANDMARK_TRACE)")]
    NoFrameSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ExitReason {
    StopRequested,
    EndOfStream,
    CaptureFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub drowsy_frames: u64,
    pub escalations: u64,
    pub exit: ExitReason,
}

pub struct Session<C: CommandChannel, G, S> {
    evaluator: FrameEvaluator,
    machine: DrowsinessStateMachine,
    sequencer: EscalationSequencer<G, S>,
    detector: Box<dyn LandmarkDetector>,
    actuator: ActuatorController<C>,
    frame_size: (u32, u32),
}

impl<C, G, S> Session<C, G, S>
where
    C: CommandChannel,
    G: GeoLocator,
    S: SmsSender,
{
    pub fn new(
        config: &DetectionConfig,
        detector: Box<dyn LandmarkDetector>,
        sequencer: EscalationSequencer<G, S>,
        actuator: ActuatorController<C>,
    ) -> Self {
        Self {
            evaluator: FrameEvaluator::from_config(config),
            machine: DrowsinessStateMachine::new(config.frame_check),
            sequencer,
            detector,
            actuator,
            frame_size: (config.frame_width, config.frame_height),
        }
    }

    /// 运行至停止信号、流结束或取帧失败；任何退出路径都只关闭执行器一次
    pub async fn run(
        mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> SessionSummary {
        let mut summary = SessionSummary {
            frames: 0,
            drowsy_frames: 0,
            escalations: 0,
            exit: ExitReason::EndOfStream,
        };
        tracing::info!(
            ear_threshold = self.evaluator.ear_threshold(),
            frame_check = self.machine.frame_check(),
            "Monitoring started"
        );

        let exit = loop {
            if stop_requested(shutdown) {
                break ExitReason::StopRequested;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break ExitReason::EndOfStream,
                Err(e) => {
                    tracing::error!(error = %e, "Frame capture failed, stopping");
                    break ExitReason::CaptureFailed(e.to_string());
                }
            };
            summary.frames += 1;

            let frame = frame.resized(self.frame_size.0, self.frame_size.1);
            let evaluation = self.evaluator.evaluate(frame, self.detector.as_ref());
            if evaluation.is_drowsy {
                summary.drowsy_frames += 1;
            }

            match self.machine.update(evaluation.is_drowsy) {
                Action::Hold => {}
                Action::Escalate { .. } => {
                    let report = self
                        .sequencer
                        .escalate(EscalationEvent::now(), &mut self.actuator)
                        .await;
                    summary.escalations += 1;
                    tracing::debug!(event_id = %report.event.id, sms = ?report.sms, "Escalation finished");
                }
                Action::Resume => {
                    self.actuator.send_logged(ActuatorCommand::Run);
                }
            }

            if sink.present(&evaluation.annotated) == SinkControl::Quit {
                break ExitReason::StopRequested;
            }

            // 让出执行权，使信号处理任务有机会运行
            tokio::task::yield_now().await;
        };
        summary.exit = exit;

        if let Err(e) = self.actuator.shutdown() {
            tracing::error!(error = %e, "Actuator shutdown failed");
        }
        tracing::info!(
            frames = summary.frames,
            drowsy_frames = summary.drowsy_frames,
            escalations = summary.escalations,
            exit = ?summary.exit,
            "Monitoring stopped"
        );
        summary
    }
}

fn stop_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    match shutdown.try_recv() {
        Ok(()) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => false,
    }
}
