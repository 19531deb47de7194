use std::env;
use std::ops::Range;
use std::str::FromStr;

use std::fmt;

use crate::constants::*;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub landmark_trace: Option<String>,
    pub detection: DetectionConfig,
    pub actuator: ActuatorConfig,
    pub alarm: AlarmConfig,
    pub geo: GeoConfig,
    pub sms: SmsConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    pub ear_threshold: f64,
    pub frame_check: u32,
    pub left_eye: Range<usize>,
    pub right_eye: Range<usize>,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            frame_check: DEFAULT_FRAME_CHECK,
            left_eye: DEFAULT_LEFT_EYE_RANGE.0..DEFAULT_LEFT_EYE_RANGE.1,
            right_eye: DEFAULT_RIGHT_EYE_RANGE.0..DEFAULT_RIGHT_EYE_RANGE.1,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActuatorConfig {
    pub port: String,
    pub baud: u32,
    pub settle_ms: u64,
    pub alert_pulse_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AlarmConfig {
    pub sound_file: String,
    pub player: String,
}

#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Clone)]
pub struct SmsConfig {
    pub enabled: bool,
    pub api_base: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsConfig")
            .field("enabled", &self.enabled)
            .field("api_base", &self.api_base)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***REDACTED***")
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = DetectionConfig::default();
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            landmark_trace: env::var("LANDMARK_TRACE").ok().filter(|v| !v.trim().is_empty()),
            detection: DetectionConfig {
                ear_threshold: env_or_parse("EAR_THRESHOLD", DEFAULT_EAR_THRESHOLD),
                // 0 帧确认没有意义，至少需要 1 帧
                frame_check: env_or_parse("FRAME_CHECK", DEFAULT_FRAME_CHECK).max(1),
                left_eye: env_or_range("LEFT_EYE_RANGE", defaults.left_eye),
                right_eye: env_or_range("RIGHT_EYE_RANGE", defaults.right_eye),
                frame_width: env_or_parse("FRAME_WIDTH", DEFAULT_FRAME_WIDTH),
                frame_height: env_or_parse("FRAME_HEIGHT", DEFAULT_FRAME_HEIGHT),
            },
            actuator: ActuatorConfig {
                port: env_or("ACTUATOR_PORT", DEFAULT_ACTUATOR_PORT),
                baud: env_or_parse("ACTUATOR_BAUD", DEFAULT_ACTUATOR_BAUD),
                settle_ms: env_or_parse("ACTUATOR_SETTLE_MS", DEFAULT_ACTUATOR_SETTLE_MS),
                alert_pulse_ms: env_or_parse("ALERT_PULSE_MS", DEFAULT_ALERT_PULSE_MS),
            },
            alarm: AlarmConfig {
                sound_file: env_or("ALARM_SOUND_FILE", DEFAULT_ALARM_SOUND_FILE),
                player: env_or("ALARM_PLAYER", DEFAULT_ALARM_PLAYER),
            },
            geo: GeoConfig {
                url: env_or("GEO_URL", DEFAULT_GEO_URL),
                timeout_secs: env_or_parse("GEO_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            },
            sms: SmsConfig {
                enabled: env_or_bool("SMS_ENABLED", false),
                api_base: env_or("TWILIO_API_BASE", DEFAULT_TWILIO_API_BASE),
                account_sid: env_or("TWILIO_ACCOUNT_SID", ""),
                auth_token: env_or("TWILIO_AUTH_TOKEN", ""),
                from_number: env_or("TWILIO_FROM", ""),
                to_number: env_or("SMS_TO", ""),
                timeout_secs: env_or_parse("SMS_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Parses an eye landmark range written as `start,end`.
/// The range must cover exactly one eye (6 points).
pub fn env_or_range(key: &str, default: Range<usize>) -> Range<usize> {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    match parse_range(&raw) {
        Some(range) if range.len() == EYE_LANDMARK_COUNT => range,
        _ => {
            tracing::warn!(
                key,
                value = %raw,
                "Invalid eye landmark range, using default"
            );
            default
        }
    }
}

fn parse_range(raw: &str) -> Option<Range<usize>> {
    let (start, end) = raw.split_once(',')?;
    let start = start.trim().parse::<usize>().ok()?;
    let end = end.trim().parse::<usize>().ok()?;
    (start < end).then_some(start..end)
}
