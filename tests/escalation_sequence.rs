mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use wake_watch::actuator::ActuatorCommand::{Alert, Run};
use wake_watch::escalation::{EscalationEvent, EscalationSequencer, StepOutcome};

use common::fakes::{CountingAlarm, FakeGeo, FakeSms, RecordingChannel};
use common::started_actuator;

#[tokio::test(start_paused = true)]
async fn it_runs_all_steps_in_order() {
    let channel = RecordingChannel::default();
    let mut actuator = started_actuator(channel.clone()).await;
    let alarm = CountingAlarm::default();
    let sms = FakeSms::default();
    let sequencer = EscalationSequencer::new(Box::new(alarm.clone()), FakeGeo::at(1.5, -2.25), sms.clone());

    let started = tokio::time::Instant::now();
    let report = sequencer.escalate(EscalationEvent::now(), &mut actuator).await;

    assert!(started.elapsed() >= Duration::from_millis(750));
    assert_eq!(channel.commands(), vec![Run, Alert, Run, Alert]);
    assert_eq!(alarm.plays.load(Ordering::SeqCst), 1);
    assert!(report.alert.is_done());
    assert!(report.alarm.is_done());
    assert!(report.pulse.is_done());
    assert!(report.location.is_done());
    assert!(report.sms.is_done());
    assert_eq!(
        report.event.location_link.as_deref(),
        Some("https://www.google.com/maps?q=1.5,-2.25")
    );
    assert_eq!(
        sms.sent(),
        vec!["Drowsiness Alert! Location: https://www.google.com/maps?q=1.5,-2.25".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn it_skips_sms_without_location() {
    let channel = RecordingChannel::default();
    let mut actuator = started_actuator(channel.clone()).await;
    let sms = FakeSms::default();
    let sequencer = EscalationSequencer::new(
        Box::new(CountingAlarm::default()),
        FakeGeo::unavailable(),
        sms.clone(),
    );

    let report = sequencer.escalate(EscalationEvent::now(), &mut actuator).await;

    assert!(matches!(report.location, StepOutcome::Failed(_)));
    assert_eq!(report.sms, StepOutcome::Skipped);
    assert!(report.event.location_link.is_none());
    assert!(sms.sent().is_empty());
    assert_eq!(channel.commands(), vec![Run, Alert, Run, Alert]);
}

#[tokio::test(start_paused = true)]
async fn it_isolates_each_failing_step() {
    let channel = RecordingChannel::default();
    let mut actuator = started_actuator(channel.clone()).await;
    channel.set_failing(true);

    let alarm = CountingAlarm {
        fail: true,
        ..CountingAlarm::default()
    };
    let geo = FakeGeo::at(10.0, 20.0);
    let sms = FakeSms {
        fail: true,
        ..FakeSms::default()
    };
    let sequencer = EscalationSequencer::new(Box::new(alarm.clone()), geo.clone(), sms);

    let report = sequencer.escalate(EscalationEvent::now(), &mut actuator).await;

    assert!(matches!(report.alert, StepOutcome::Failed(_)));
    assert!(matches!(report.alarm, StepOutcome::Failed(_)));
    assert!(matches!(report.pulse, StepOutcome::Failed(_)));
    assert!(report.location.is_done());
    assert!(matches!(report.sms, StepOutcome::Failed(_)));
    // 前面的步骤失败后仍然继续执行后续步骤
    assert_eq!(alarm.plays.load(Ordering::SeqCst), 1);
    assert_eq!(geo.calls.load(Ordering::SeqCst), 1);
    assert_eq!(actuator.send_failures(), 3);
}

#[test]
fn event_keeps_timestamp_when_location_attached() {
    let event = EscalationEvent::now();
    let located = event.clone().with_location("https://example.test/map".to_string());
    assert_eq!(located.id, event.id);
    assert_eq!(located.timestamp, event.timestamp);
    assert_eq!(
        located.sms_body().as_deref(),
        Some("Drowsiness Alert! Location: https://example.test/map")
    );
    assert!(event.sms_body().is_none());
}
