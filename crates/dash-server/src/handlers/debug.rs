use crate::{models::MessageResponse, state::AppState};
use axum::{extract::State, Json};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// CPU 压测：在阻塞线程上空转一段时间，用于验证告警链路
pub async fn stress_cpu(State(state): State<AppState>) -> Json<MessageResponse> {
    let duration = state.stress_duration;
    warn!(duration_secs = duration.as_secs(), "CPU stress test requested");

    tokio::task::spawn_blocking(move || {
        burn(duration);
        info!("CPU stress test finished");
    });

    Json(MessageResponse::new(format!(
        "CPU stress test started ({}s)",
        duration.as_secs()
    )))
}

fn burn(duration: Duration) {
    let started = Instant::now();
    let mut x: u64 = 0;
    while started.elapsed() < duration {
        x = std::hint::black_box(x.wrapping_mul(6364136223846793005).wrapping_add(1));
    }
}
