//! 执行器控制（电机 / LED，经串口）
//!
//! 两条逻辑命令：RUN (`"0\n"`) 与 ALERT (`"1\n"`)，每次写入一条。
//! 控制器独占串口句柄；会话结束时 `shutdown` 发送最终 RUN 并释放句柄，
//! 未显式关闭时由 `Drop` 兜底，保证只执行一次。

use std::io::{self, Write};
use std::time::Duration;

use serialport::SerialPort;

use crate::config::ActuatorConfig;
use crate::constants::SERIAL_WRITE_TIMEOUT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    Run,
    Alert,
}

impl ActuatorCommand {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Run => b"0\n",
            Self::Alert => b"1\n",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Alert => "alert",
        }
    }
}

/// 面向字节的命令通道
pub trait CommandChannel {
    fn write_command(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// 串口（如 `/dev/ttyACM0`），以固定波特率打开，写操作带超时
pub struct SerialDevice {
    port: Box<dyn SerialPort>,
}

impl SerialDevice {
    pub fn open(path: &str, baud: u32, timeout: Duration) -> serialport::Result<Self> {
        let port = serialport::new(path, baud).timeout(timeout).open()?;
        Ok(Self { port })
    }
}

impl CommandChannel for SerialDevice {
    fn write_command(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorTiming {
    /// 打开通道后、发送首条命令前后各等待一次
    pub settle: Duration,
    /// 告警脉冲保持时长
    pub alert_pulse: Duration,
}

impl From<&ActuatorConfig> for ActuatorTiming {
    fn from(config: &ActuatorConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.settle_ms),
            alert_pulse: Duration::from_millis(config.alert_pulse_ms),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("failed to open actuator port {port} at {baud} baud: {source}")]
    Open {
        port: String,
        baud: u32,
        #[source]
        source: serialport::Error,
    },
    #[error("actuator handshake failed: {0}")]
    Handshake(#[source] io::Error),
    #[error("failed to send {command:?} command: {source}")]
    Send {
        command: ActuatorCommand,
        #[source]
        source: io::Error,
    },
    #[error("actuator channel already closed")]
    Closed,
}

pub struct ActuatorController<C: CommandChannel> {
    channel: Option<C>,
    alert_pulse: Duration,
    commands_sent: u64,
    send_failures: u64,
}

impl ActuatorController<SerialDevice> {
    /// Opens the serial port at the configured baud rate and performs the startup handshake.
    pub async fn connect(config: &ActuatorConfig) -> Result<Self, ActuatorError> {
        let device = SerialDevice::open(&config.port, config.baud, SERIAL_WRITE_TIMEOUT)
            .map_err(|source| ActuatorError::Open {
                port: config.port.clone(),
                baud: config.baud,
                source,
            })?;
        tracing::info!(port = %config.port, baud = config.baud, "Actuator port opened");
        Self::startup(device, ActuatorTiming::from(config)).await
    }
}

impl<C: CommandChannel> ActuatorController<C> {
    /// 握手：等待设备就绪 → 发送 RUN → 再等待
    pub async fn startup(mut channel: C, timing: ActuatorTiming) -> Result<Self, ActuatorError> {
        tokio::time::sleep(timing.settle).await;
        channel
            .write_command(ActuatorCommand::Run.as_bytes())
            .map_err(ActuatorError::Handshake)?;
        tokio::time::sleep(timing.settle).await;
        tracing::info!("Actuator running");

        Ok(Self {
            channel: Some(channel),
            alert_pulse: timing.alert_pulse,
            commands_sent: 1,
            send_failures: 0,
        })
    }

    pub fn alert_pulse(&self) -> Duration {
        self.alert_pulse
    }

    pub fn commands_sent(&self) -> u64 {
        self.commands_sent
    }

    pub fn send_failures(&self) -> u64 {
        self.send_failures
    }

    pub fn send(&mut self, command: ActuatorCommand) -> Result<(), ActuatorError> {
        let channel = self.channel.as_mut().ok_or(ActuatorError::Closed)?;
        match channel.write_command(command.as_bytes()) {
            Ok(()) => {
                self.commands_sent += 1;
                tracing::trace!(command = command.as_str(), "Actuator command sent");
                Ok(())
            }
            Err(source) => {
                self.send_failures += 1;
                Err(ActuatorError::Send { command, source })
            }
        }
    }

    /// Best-effort send: failures are logged and swallowed.
    pub fn send_logged(&mut self, command: ActuatorCommand) -> bool {
        match self.send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Actuator command failed");
                false
            }
        }
    }

    /// 发送最终 RUN 并释放通道
    pub fn shutdown(mut self) -> Result<(), ActuatorError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        let mut channel = self.channel.take().ok_or(ActuatorError::Closed)?;
        let result = channel
            .write_command(ActuatorCommand::Run.as_bytes())
            .map_err(|source| ActuatorError::Send {
                command: ActuatorCommand::Run,
                source,
            });
        if result.is_ok() {
            self.commands_sent += 1;
        }
        tracing::info!(
            commands_sent = self.commands_sent,
            send_failures = self.send_failures,
            "Actuator channel released"
        );
        result
    }
}

impl<C: CommandChannel> Drop for ActuatorController<C> {
    fn drop(&mut self) {
        if self.channel.is_some() {
            if let Err(e) = self.release() {
                tracing::error!(error = %e, "Failed to release actuator channel");
            }
        }
    }
}
