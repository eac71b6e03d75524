use dash_metrics::Sample;
use serde::{Deserialize, Serialize};

/// 当前负载
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub cpu: f64,
    pub ram: f64,
}

impl From<Sample> for StatusResponse {
    fn from(sample: Sample) -> Self {
        Self {
            cpu: sample.cpu_percent,
            ram: sample.ram_percent,
        }
    }
}

/// 历史数据点，时间为 UTC `HH:MM:SS`
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub time: String,
    pub cpu: f64,
    pub ram: f64,
}

impl From<Sample> for HistoryPoint {
    fn from(sample: Sample) -> Self {
        Self {
            time: sample.timestamp.format("%H:%M:%S").to_string(),
            cpu: sample.cpu_percent,
            ram: sample.ram_percent,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

/// 容器重启请求
#[derive(Debug, Deserialize)]
pub struct RestartRequest {
    #[serde(rename = "containerId")]
    pub container_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub id: Option<String>,
}

/// 通用消息响应
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_history_point_time_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap();
        let point = HistoryPoint::from(Sample::new(ts, 12.345, 50.0));

        assert_eq!(point.time, "07:05:03");
        assert_eq!(point.cpu, 12.35);
        assert_eq!(point.ram, 50.0);
    }

    #[test]
    fn test_restart_request_field_name() {
        let req: RestartRequest = serde_json::from_str(r#"{"containerId":"abc123"}"#).unwrap();
        assert_eq!(req.container_id, "abc123");

        assert!(serde_json::from_str::<RestartRequest>(r#"{"container_id":"abc123"}"#).is_err());
    }
}
