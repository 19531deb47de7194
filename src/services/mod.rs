//! External collaborators used by the escalation sequence.

pub mod alarm;
pub mod geolocation;
pub mod sms;

pub use alarm::{Alarm, AlarmError, CommandAlarm};
pub use geolocation::{GeoError, GeoLocator, IpGeolocator, Location};
pub use sms::{SmsError, SmsSender, TwilioSms};

use std::time::Duration;

/// 带总超时的 HTTP 客户端；构建失败直接返回，不退回无超时的默认客户端
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}
