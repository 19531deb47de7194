use std::time::Duration;

/// EAR 闭眼阈值，平均 EAR 严格小于此值视为该帧困倦
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.25;

/// 确认困倦所需的连续困倦帧数
pub const DEFAULT_FRAME_CHECK: u32 = 20;

/// 68 点面部关键点布局中的左眼区间 [start, end)
pub const DEFAULT_LEFT_EYE_RANGE: (usize, usize) = (42, 48);

/// 68 点面部关键点布局中的右眼区间 [start, end)
pub const DEFAULT_RIGHT_EYE_RANGE: (usize, usize) = (36, 42);

/// 每只眼睛的关键点数量
pub const EYE_LANDMARK_COUNT: usize = 6;

/// Frames are resized to this size before evaluation.
pub const DEFAULT_FRAME_WIDTH: u32 = 450;
pub const DEFAULT_FRAME_HEIGHT: u32 = 300;

pub const DEFAULT_ACTUATOR_PORT: &str = "/dev/ttyACM0";
pub const DEFAULT_ACTUATOR_BAUD: u32 = 9600;

/// 单条命令写入串口的超时
pub const SERIAL_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// 串口打开后等待设备就绪的时长（毫秒）
pub const DEFAULT_ACTUATOR_SETTLE_MS: u64 = 2000;

/// 告警脉冲保持时长（毫秒）
pub const DEFAULT_ALERT_PULSE_MS: u64 = 750;

pub const DEFAULT_ALARM_SOUND_FILE: &str = "alarm.wav";
pub const DEFAULT_ALARM_PLAYER: &str = "aplay";

pub const DEFAULT_GEO_URL: &str = "http://ip-api.com/json/";
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

pub const MAPS_LINK_BASE: &str = "https://www.google.com/maps?q=";
pub const SMS_ALERT_PREFIX: &str = "Drowsiness Alert! Location: ";
