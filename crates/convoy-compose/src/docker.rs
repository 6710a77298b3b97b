//! Docker Engine API 経由の状態照会とログ取得
//!
//! compose が各コンテナへ付与するラベルでプロジェクトを特定する。

// Bollard 0.19 の非推奨APIを一時的に使用
#![allow(deprecated)]

use crate::error::{ComposeError, Result};
use bollard::Docker;
use bollard::container::{InspectContainerOptions, ListContainersOptions, LogOutput, LogsOptions};
use bollard::models::HealthStatusEnum;
use colored::Colorize;
use convoy_core::{ResolvedProject, ServiceStatus};
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;

/// compose がコンテナに付与するプロジェクトラベル
const PROJECT_LABEL: &str = "com.docker.compose.project";
/// compose がコンテナに付与するサービスラベル
const SERVICE_LABEL: &str = "com.docker.compose.service";

/// Docker 接続を確立する（接続テスト込み）
pub async fn connect() -> Result<Docker> {
    let docker = Docker::connect_with_local_defaults()
        .map_err(|e| ComposeError::DockerConnectionFailed(e.to_string()))?;

    docker
        .ping()
        .await
        .map_err(|e| ComposeError::DockerConnectionFailed(e.to_string()))?;

    Ok(docker)
}

/// プロジェクトに属するコンテナを列挙する
///
/// 戻り値は (サービス名, コンテナ名) の組。
async fn list_project_containers(
    docker: &Docker,
    project: &ResolvedProject,
    service: Option<&str>,
) -> Result<Vec<(String, String)>> {
    let mut labels = vec![format!("{}={}", PROJECT_LABEL, project.name)];
    if let Some(service) = service {
        labels.push(format!("{}={}", SERVICE_LABEL, service));
    }

    let mut filters = HashMap::new();
    filters.insert("label".to_string(), labels);

    let options = ListContainersOptions::<String> {
        all: true,
        filters,
        ..Default::default()
    };

    let containers = docker
        .list_containers(Some(options))
        .await
        .map_err(ComposeError::from)?;

    let mut result = Vec::with_capacity(containers.len());
    for container in containers {
        let service_name = container
            .labels
            .as_ref()
            .and_then(|labels| labels.get(SERVICE_LABEL))
            .cloned();
        let container_name = container
            .names
            .as_ref()
            .and_then(|names| names.first())
            .map(|name| name.trim_start_matches('/').to_string());

        if let (Some(service_name), Some(container_name)) = (service_name, container_name) {
            result.push((service_name, container_name));
        }
    }
    Ok(result)
}

/// プロジェクトの各サービスの現在状態を取得する
pub async fn query_status(
    docker: &Docker,
    project: &ResolvedProject,
    service: Option<&str>,
) -> Result<Vec<ServiceStatus>> {
    let containers = list_project_containers(docker, project, service).await?;

    let mut statuses = Vec::with_capacity(containers.len());
    for (service_name, container_name) in containers {
        statuses.push(inspect_status(docker, &service_name, &container_name).await?);
    }
    Ok(statuses)
}

/// コンテナ1つを inspect して観測値へ変換する
async fn inspect_status(
    docker: &Docker,
    service_name: &str,
    container_name: &str,
) -> Result<ServiceStatus> {
    let inspect = docker
        .inspect_container(container_name, None::<InspectContainerOptions>)
        .await
        .map_err(ComposeError::from)?;

    let state = inspect.state.as_ref();

    let lifecycle = state
        .and_then(|s| s.status)
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    // ヘルスチェック未定義（NONE / EMPTY）は None にする
    let health = state
        .and_then(|s| s.health.as_ref())
        .and_then(|h| h.status)
        .and_then(|status| match status {
            HealthStatusEnum::HEALTHY => Some("healthy".to_string()),
            HealthStatusEnum::UNHEALTHY => Some("unhealthy".to_string()),
            HealthStatusEnum::STARTING => Some("starting".to_string()),
            _ => None,
        });

    let status_text = state
        .and_then(|s| s.running)
        .map(|running| if running { "Up" } else { "Exited" })
        .unwrap_or("N/A");
    let status_text = match &health {
        Some(health) => format!("{} ({})", status_text, health),
        None => status_text.to_string(),
    };

    let ports = inspect
        .network_settings
        .as_ref()
        .and_then(|settings| settings.ports.as_ref())
        .map(|ports| {
            ports
                .iter()
                .filter_map(|(container_port, bindings)| {
                    let binding = bindings.as_ref()?.first()?;
                    let host_port = binding.host_port.as_deref()?;
                    Some(format!("{}:{}", host_port, container_port))
                })
                .collect()
        })
        .unwrap_or_default();

    let image = inspect
        .config
        .as_ref()
        .and_then(|config| config.image.clone())
        .unwrap_or_default();

    Ok(ServiceStatus {
        name: service_name.to_string(),
        state: lifecycle,
        status: status_text,
        health,
        ports,
        image,
    })
}

/// プロジェクトのコンテナログを出力する
///
/// 複数サービスの場合はストリームをマージし、サービスごとに色分けした
/// プレフィックスを付ける。
pub async fn stream_logs(
    docker: &Docker,
    project: &ResolvedProject,
    service: Option<&str>,
    tail: usize,
    follow: bool,
) -> Result<()> {
    let containers = list_project_containers(docker, project, service).await?;

    if containers.is_empty() {
        println!("{}", "対象のコンテナがありません".dimmed());
        return Ok(());
    }

    let colors = [
        colored::Color::Cyan,
        colored::Color::Green,
        colored::Color::Yellow,
        colored::Color::Magenta,
        colored::Color::Blue,
    ];

    let mut streams = Vec::with_capacity(containers.len());
    for (idx, (service_name, container_name)) in containers.iter().enumerate() {
        let options = LogsOptions::<String> {
            follow,
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            timestamps: true,
            ..Default::default()
        };

        let service_name = service_name.clone();
        let color = colors[idx % colors.len()];
        let stream = docker
            .logs(container_name, Some(options))
            .map(move |log| (service_name.clone(), color, log));
        streams.push(Box::pin(stream));
    }

    let mut merged = stream::select_all(streams);
    while let Some((service_name, color, log)) = merged.next().await {
        match log {
            Ok(output) => print_log_output(&service_name, color, &output),
            Err(e) => {
                eprintln!("  ⚠ ログ取得エラー ({}): {}", service_name, e);
            }
        }
    }

    Ok(())
}

fn print_log_output(service_name: &str, color: colored::Color, output: &LogOutput) {
    let prefix = format!("[{}]", service_name).color(color);

    match output {
        LogOutput::StdOut { message } | LogOutput::Console { message } => {
            let msg = String::from_utf8_lossy(message);
            for line in msg.lines() {
                if !line.is_empty() {
                    println!("{} {}", prefix, line);
                }
            }
        }
        LogOutput::StdErr { message } => {
            let msg = String::from_utf8_lossy(message);
            for line in msg.lines() {
                if !line.is_empty() {
                    println!("{} {} {}", prefix, "stderr:".red(), line);
                }
            }
        }
        LogOutput::StdIn { .. } => {}
    }
}
