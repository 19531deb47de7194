//! 困倦确认后的升级序列
//!
//! 固定顺序，每一步独立容错（失败只记录，不中断后续步骤）：
//! 1. 执行器 ALERT
//! 2. 播放本地警报
//! 3. 保持脉冲后发送 RUN 再发送 ALERT（闪烁式双脉冲）
//! 4. 查询地理位置，生成地图链接
//! 5. 定位成功时发送短信
//!
//! 整个序列在帧循环内同步执行，期间不处理新帧。

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::actuator::{ActuatorCommand, ActuatorController, CommandChannel};
use crate::constants::SMS_ALERT_PREFIX;
use crate::services::{Alarm, GeoLocator, SmsSender};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscalationEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub location_link: Option<String>,
}

impl EscalationEvent {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            location_link: None,
        }
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn with_location(self, link: String) -> Self {
        Self {
            location_link: Some(link),
            ..self
        }
    }

    pub fn sms_body(&self) -> Option<String> {
        self.location_link
            .as_ref()
            .map(|link| format!("{SMS_ALERT_PREFIX}{link}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StepOutcome {
    Done,
    Failed(String),
    Skipped,
}

impl StepOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    fn from_result<E: std::fmt::Display>(step: &'static str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Done,
            Err(e) => {
                tracing::warn!(step, error = %e, "Escalation step failed");
                Self::Failed(e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EscalationReport {
    pub event: EscalationEvent,
    pub alert: StepOutcome,
    pub alarm: StepOutcome,
    pub pulse: StepOutcome,
    pub location: StepOutcome,
    pub sms: StepOutcome,
}

pub struct EscalationSequencer<G, S> {
    alarm: Box<dyn Alarm>,
    geo: G,
    sms: S,
}

impl<G: GeoLocator, S: SmsSender> EscalationSequencer<G, S> {
    pub fn new(alarm: Box<dyn Alarm>, geo: G, sms: S) -> Self {
        Self { alarm, geo, sms }
    }

    pub async fn escalate<C: CommandChannel>(
        &self,
        event: EscalationEvent,
        actuator: &mut ActuatorController<C>,
    ) -> EscalationReport {
        tracing::warn!(event_id = %event.id, at = %event.timestamp, "Drowsiness detected, escalating");

        let alert = StepOutcome::from_result("alert", actuator.send(ActuatorCommand::Alert));
        let alarm = StepOutcome::from_result("alarm", self.alarm.play());

        tokio::time::sleep(actuator.alert_pulse()).await;
        let run = actuator.send(ActuatorCommand::Run);
        let realert = actuator.send(ActuatorCommand::Alert);
        let pulse = StepOutcome::from_result("pulse", run.and(realert));

        let (event, location) = match self.geo.locate().await {
            Ok(loc) => {
                let link = loc.maps_link();
                tracing::info!(event_id = %event.id, maps_link = %link, "Location attached");
                (event.with_location(link), StepOutcome::Done)
            }
            Err(e) => {
                tracing::warn!(event_id = %event.id, error = %e, "Could not retrieve location");
                (event, StepOutcome::Failed(e.to_string()))
            }
        };

        let sms = match event.sms_body() {
            Some(body) => match self.sms.send(&body).await {
                Ok(_) => StepOutcome::Done,
                Err(e) => {
                    tracing::warn!(event_id = %event.id, error = %e, "Failed to send SMS");
                    StepOutcome::Failed(e.to_string())
                }
            },
            None => StepOutcome::Skipped,
        };

        EscalationReport {
            event,
            alert,
            alarm,
            pulse,
            location,
            sms,
        }
    }
}
