use crate::sample::Sample;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 默认 CPU 告警阈值（百分比）
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// 默认告警冷却时间（秒）：10 分钟
pub const DEFAULT_COOLDOWN_SECS: i64 = 600;

/// 告警判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    Trigger,
    Suppress,
}

/// 冷却时间戳的更新时机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownPolicy {
    /// 仅在通知确认送达后开始冷却
    #[default]
    OnDelivery,
    /// 一旦决定发送即开始冷却，无论是否送达
    OnDispatch,
}

/// 告警状态
///
/// 只由采集循环持有和修改，进程重启即重置。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertState {
    pub last_alert_at: Option<DateTime<Utc>>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次已计入冷却的告警
    pub fn record_alert(&mut self, at: DateTime<Utc>) {
        self.last_alert_at = Some(at);
    }
}

/// 带冷却的阈值告警门
#[derive(Debug, Clone)]
pub struct AlertGate {
    threshold: f64,
    cooldown: Duration,
}

impl AlertGate {
    pub fn new(threshold: f64, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// 判定本次采样是否需要发送告警
    ///
    /// `cpu_percent >= threshold` 且距上次告警已超过冷却时间（或从未告警）时返回 `Trigger`。
    /// 该方法不修改状态，调用方根据 [`CooldownPolicy`] 决定何时调用 [`AlertState::record_alert`]。
    pub fn evaluate(&self, sample: &Sample, state: &AlertState, now: DateTime<Utc>) -> AlertDecision {
        if sample.cpu_percent < self.threshold {
            return AlertDecision::Suppress;
        }

        match state.last_alert_at {
            Some(last) if now - last < self.cooldown => {
                debug!(
                    cpu = sample.cpu_percent,
                    since_last_secs = (now - last).num_seconds(),
                    "Alert suppressed by cooldown"
                );
                AlertDecision::Suppress
            }
            _ => AlertDecision::Trigger,
        }
    }
}

impl Default for AlertGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, Duration::seconds(DEFAULT_COOLDOWN_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn sample_at(secs: i64, cpu: f64) -> Sample {
        Sample::new(t0() + Duration::seconds(secs), cpu, 50.0)
    }

    #[test]
    fn test_below_threshold_never_triggers() {
        let gate = AlertGate::default();
        let state = AlertState::new();

        assert_eq!(gate.evaluate(&sample_at(0, 79.99), &state, t0()), AlertDecision::Suppress);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let gate = AlertGate::new(80.0, Duration::seconds(DEFAULT_COOLDOWN_SECS));
        let state = AlertState::new();

        assert_eq!(gate.evaluate(&sample_at(0, 80.0), &state, t0()), AlertDecision::Trigger);
    }

    #[test]
    fn test_cooldown_scenario() {
        let gate = AlertGate::default();
        let mut state = AlertState::new();

        let now = t0();
        assert_eq!(gate.evaluate(&sample_at(0, 85.0), &state, now), AlertDecision::Trigger);
        state.record_alert(now);

        let now = t0() + Duration::seconds(300);
        assert_eq!(gate.evaluate(&sample_at(300, 90.0), &state, now), AlertDecision::Suppress);

        let now = t0() + Duration::seconds(650);
        assert_eq!(gate.evaluate(&sample_at(650, 82.0), &state, now), AlertDecision::Trigger);
    }

    #[test]
    fn test_cooldown_boundary_triggers() {
        let gate = AlertGate::default();
        let mut state = AlertState::new();
        state.record_alert(t0());

        let now = t0() + Duration::seconds(DEFAULT_COOLDOWN_SECS);
        assert_eq!(gate.evaluate(&sample_at(600, 95.0), &state, now), AlertDecision::Trigger);
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: CooldownPolicy = serde_json::from_str("\"on_dispatch\"").unwrap();
        assert_eq!(policy, CooldownPolicy::OnDispatch);
        assert_eq!(CooldownPolicy::default(), CooldownPolicy::OnDelivery);
    }
}
