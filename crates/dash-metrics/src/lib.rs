pub mod alert;
pub mod clock;
pub mod collector;
pub mod sample;
pub mod system;

pub use alert::{AlertDecision, AlertGate, AlertState, CooldownPolicy, DEFAULT_COOLDOWN_SECS, DEFAULT_THRESHOLD};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collector::MetricsCollector;
pub use sample::{round2, Sample};
pub use system::{CollectionError, HostSampler, Sampler};
