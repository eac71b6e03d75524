//! 基于 `docker` 命令行的容器运行时

use crate::runtime::{validate_id, ContainerInfo, ContainerRuntime, RuntimeControlError};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

/// 默认命令超时（秒）
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// `docker ps --format '{{json .}}'` 的单行输出
#[derive(Debug, Deserialize)]
struct PsLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names", default)]
    names: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Status", default)]
    status: String,
}

/// Docker CLI 运行时
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    timeout: Duration,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// 执行命令，非零退出码视为失败
    async fn run(&self, args: &[&str]) -> Result<Output, RuntimeControlError> {
        let command = format!("{} {}", self.binary, args.join(" "));
        debug!(command = %command, "Running container runtime command");

        let output = timeout(self.timeout, Command::new(&self.binary).args(args).kill_on_drop(true).output())
            .await
            .map_err(|_| RuntimeControlError::Timeout(command.clone()))?
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    RuntimeControlError::Unavailable(format!("{}: {}", self.binary, e))
                }
                _ => RuntimeControlError::CommandFailed {
                    command: command.clone(),
                    stderr: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(RuntimeControlError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

/// 解析 `docker ps` 的 JSON 行输出
///
/// 名称取第一个，并去掉开头的 `/`；没有名称的容器被跳过。
pub fn parse_ps_output(stdout: &str) -> Result<Vec<ContainerInfo>, RuntimeControlError> {
    let mut containers = Vec::new();

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let ps: PsLine = serde_json::from_str(line).map_err(|e| RuntimeControlError::Parse(e.to_string()))?;

        let name = match ps.names.split(',').map(|n| n.trim().trim_start_matches('/')).find(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        containers.push(ContainerInfo {
            id: ps.id,
            name,
            state: ps.state,
            status: ps.status,
        });
    }

    Ok(containers)
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn list(&self) -> Result<Vec<ContainerInfo>, RuntimeControlError> {
        let output = self.run(&["ps", "-a", "--no-trunc", "--format", "{{json .}}"]).await?;
        parse_ps_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn start(&self, id: &str) -> Result<(), RuntimeControlError> {
        let id = validate_id(id)?;
        self.run(&["start", id]).await?;
        info!(container_id = %id, "Container started");
        Ok(())
    }

    async fn stop(&self, id: &str) -> Result<(), RuntimeControlError> {
        let id = validate_id(id)?;
        self.run(&["stop", id]).await?;
        info!(container_id = %id, "Container stopped");
        Ok(())
    }

    async fn restart(&self, id: &str) -> Result<(), RuntimeControlError> {
        let id = validate_id(id)?;
        self.run(&["restart", id]).await?;
        info!(container_id = %id, "Container restarted");
        Ok(())
    }

    async fn logs(&self, id: &str, tail: usize) -> Result<String, RuntimeControlError> {
        let id = validate_id(id)?;
        let tail = tail.to_string();
        let output = self.run(&["logs", "--tail", &tail, id]).await?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ps_output() {
        let stdout = r#"
{"Command":"\"nginx\"","ID":"a1b2c3","Image":"nginx","Names":"dash-web","State":"running","Status":"Up 2 hours"}
{"ID":"d4e5f6","Names":"/dash-db,alias","State":"exited","Status":"Exited (0) 5 minutes ago"}
{"ID":"noname","Names":"","State":"created","Status":"Created"}
"#;

        let containers = parse_ps_output(stdout).unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(
            containers[0],
            ContainerInfo {
                id: "a1b2c3".to_string(),
                name: "dash-web".to_string(),
                state: "running".to_string(),
                status: "Up 2 hours".to_string(),
            }
        );
        assert_eq!(containers[1].name, "dash-db");
        assert_eq!(containers[1].state, "exited");
    }

    #[test]
    fn test_parse_ps_output_empty() {
        assert!(parse_ps_output("").unwrap().is_empty());
        assert!(parse_ps_output("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_ps_output_invalid_json() {
        let result = parse_ps_output("not json");
        assert!(matches!(result, Err(RuntimeControlError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let cli = DockerCli::new("/nonexistent/dash-docker-binary");
        let result = cli.list().await;
        assert!(matches!(result, Err(RuntimeControlError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_id_rejected_before_running() {
        let cli = DockerCli::new("/nonexistent/dash-docker-binary");
        let result = cli.restart("").await;
        assert!(matches!(result, Err(RuntimeControlError::InvalidId(_))));
    }
}
