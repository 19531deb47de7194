use std::sync::Arc;

use tokio::sync::broadcast;
use wake_watch::actuator::ActuatorController;
use wake_watch::config::Config;
use wake_watch::escalation::EscalationSequencer;
use wake_watch::logging::{init_tracing, LogConfig};
use wake_watch::replay::{LandmarkTrace, TraceDetector, TraceFrameSource};
use wake_watch::services::{CommandAlarm, IpGeolocator, TwilioSms};
use wake_watch::session::{NullSink, Session, SessionError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig::from(&config));
    tracing::info!("Starting wake-watch");
    tracing::debug!(?config, "Loaded configuration");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Session aborted");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}

async fn run(config: Config) -> Result<(), SessionError> {
    let alarm = CommandAlarm::load(&config.alarm);
    let geo = IpGeolocator::new(&config.geo)?;
    let sms = TwilioSms::new(&config.sms)?;
    if !sms.is_configured() {
        tracing::warn!("SMS alerts disabled or missing Twilio credentials");
    }

    let trace_path = config
        .landmark_trace
        .as_deref()
        .ok_or(SessionError::NoFrameSource)?;
    let trace = Arc::new(LandmarkTrace::load(trace_path).await?);

    // 无法控制执行器时不进入监测
    let actuator = ActuatorController::connect(&config.actuator).await?;

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(shutdown_signal(shutdown_tx));

    let session = Session::new(
        &config.detection,
        Box::new(TraceDetector::new(trace.clone())),
        EscalationSequencer::new(Box::new(alarm), geo, sms),
        actuator,
    );
    let mut source = TraceFrameSource::new(trace);
    let summary = session
        .run(&mut source, &mut NullSink, &mut shutdown_rx)
        .await;

    match serde_json::to_string(&summary) {
        Ok(json) => tracing::info!(summary = %json, "Session finished"),
        Err(e) => tracing::warn!(error = %e, "Failed to serialize session summary"),
    }
    Ok(())
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                    let _ = shutdown_tx.send(());
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
