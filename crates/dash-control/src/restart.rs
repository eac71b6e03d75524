//! 延迟重启队列
//!
//! 请求方把容器 ID 放入有界队列后立即返回，由专门的 worker 等待固定延迟后执行重启。
//! 重启结果只记录日志，不回传给请求方。

use crate::runtime::{validate_id, ContainerRuntime, RuntimeControlError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 重启请求队列（发送端）
#[derive(Clone)]
pub struct RestartQueue {
    tx: mpsc::Sender<String>,
    delay: Duration,
}

impl RestartQueue {
    /// 创建队列并启动 worker
    pub fn spawn(
        runtime: Arc<dyn ContainerRuntime>,
        capacity: usize,
        delay: Duration,
    ) -> (Self, RestartWorkerHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run_worker(runtime, rx, delay, shutdown_rx));

        info!(capacity, delay_ms = delay.as_millis() as u64, "Restart worker started");

        (
            Self { tx, delay },
            RestartWorkerHandle {
                shutdown_tx,
                handle: Some(handle),
            },
        )
    }

    /// 提交重启请求，不等待执行
    pub fn enqueue(&self, id: &str) -> Result<(), RuntimeControlError> {
        let id = validate_id(id)?;

        self.tx.try_send(id.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                warn!(container_id = %id, "Restart queue is full");
                RuntimeControlError::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => RuntimeControlError::QueueClosed,
        })?;

        info!(container_id = %id, "Restart command queued");
        Ok(())
    }

    /// 重启前的等待时间
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

async fn run_worker(
    runtime: Arc<dyn ContainerRuntime>,
    mut rx: mpsc::Receiver<String>,
    delay: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let id = tokio::select! {
            received = rx.recv() => match received {
                Some(id) => id,
                None => break,
            },
            _ = shutdown_rx.changed() => break,
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown_rx.changed() => break,
        }

        match runtime.restart(&id).await {
            Ok(()) => info!(container_id = %id, "Container restart completed"),
            Err(e) => error!(container_id = %id, error = %e, "Container restart failed"),
        }
    }

    info!("Restart worker stopped");
}

/// worker 句柄
pub struct RestartWorkerHandle {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl RestartWorkerHandle {
    /// 停止 worker，队列中尚未执行的请求被丢弃
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}
