use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单次采样结果
///
/// 创建后不可修改；百分比在构造时统一保留两位小数。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub ram_percent: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, cpu_percent: f64, ram_percent: f64) -> Self {
        Self {
            timestamp,
            cpu_percent: round2(cpu_percent),
            ram_percent: round2(ram_percent),
        }
    }
}

/// 四舍五入到两位小数（half-up）
///
/// 先对齐到 1e-6 网格再取整，避免 `42.345 * 100.0` 这类二进制误差落到 4234.4999…
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scaled = (value * 100.0 * 1_000_000.0).round() / 1_000_000.0;
    scaled.round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round2(42.345), 42.35);
        assert_eq!(round2(42.344), 42.34);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(99.999), 100.0);
        assert_eq!(round2(12.0), 12.0);
    }

    #[test]
    fn test_sample_rounds_on_construction() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let sample = Sample::new(ts, 85.126, 40.004);

        assert_eq!(sample.cpu_percent, 85.13);
        assert_eq!(sample.ram_percent, 40.0);
        assert_eq!(sample.timestamp, ts);
    }
}
