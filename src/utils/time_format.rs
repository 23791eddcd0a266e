use std::fmt;
use std::str::FromStr;

use crate::error::CooldownError;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// 剩余时间的输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimePreset {
    /// 以冒号分隔日、时、分、秒，例如 `05:04:03:02`
    #[default]
    Std,
    /// 中文格式，例如 `5天4小时3分2秒`
    Zh,
}

impl FromStr for TimePreset {
    type Err = CooldownError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "std" => Ok(TimePreset::Std),
            "zh" => Ok(TimePreset::Zh),
            other => Err(CooldownError::InvalidPreset(other.to_string())),
        }
    }
}

impl fmt::Display for TimePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePreset::Std => write!(f, "std"),
            TimePreset::Zh => write!(f, "zh"),
        }
    }
}

/// 格式化输出剩余时间，负数按绝对值处理
pub fn format_duration(seconds: i64, preset: TimePreset) -> String {
    let total = seconds.unsigned_abs();
    let days = total / SECONDS_PER_DAY;
    let hours = total % SECONDS_PER_DAY / SECONDS_PER_HOUR;
    let minutes = total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE;
    let secs = total % SECONDS_PER_MINUTE;

    match preset {
        TimePreset::Std => format!("{:02}:{:02}:{:02}:{:02}", days, hours, minutes, secs),
        TimePreset::Zh => {
            let mut out = String::new();
            if days > 0 {
                out.push_str(&format!("{}天", days));
            }
            if hours > 0 {
                out.push_str(&format!("{}小时", hours));
            }
            if minutes > 0 {
                out.push_str(&format!("{}分", minutes));
            }
            // 更大的单位全为 0 时秒数必须输出
            if secs > 0 || out.is_empty() {
                out.push_str(&format!("{}秒", secs));
            }
            out
        }
    }
}
