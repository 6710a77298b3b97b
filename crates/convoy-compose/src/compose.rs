//! compose CLI ラッパー
//!
//! `docker compose` の各サブコマンドを薄くパラメータ変換して呼び出す。
//! 調停の判断そのものは行わない。

use crate::docker;
use crate::error::{ComposeError, Result};
use convoy_core::{
    BuildArgs, ComposeBackend, ComposeConfig, DownArgs, PullArgs, ResolvedProject, ServiceStatus,
    UpArgs,
};
use std::process::Stdio;
use tokio::process::Command;

/// compose CLI + Docker Engine API による具象バックエンド
pub struct DockerCompose {
    docker: bollard::Docker,
}

impl DockerCompose {
    /// Docker への接続を確立して生成する
    pub async fn connect() -> Result<Self> {
        let docker = docker::connect().await?;
        Ok(Self { docker })
    }

    /// compose CLI が利用可能か確認し、バージョン文字列を返す
    pub async fn check_available() -> Result<String> {
        let output = Command::new("docker")
            .args(["compose", "version", "--short"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|_| ComposeError::ComposeCliNotFound)?;

        if !output.status.success() {
            return Err(ComposeError::ComposeCliNotFound);
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// プロジェクト指定込みの `docker compose` コマンドを組み立てる
    fn base_command(&self, project: &ResolvedProject) -> Command {
        let mut cmd = Command::new("docker");
        cmd.arg("compose");
        cmd.arg("--project-name").arg(&project.name);
        for file in &project.files {
            cmd.arg("--file").arg(file);
        }
        if let Some(env_file) = &project.env_file {
            cmd.arg("--env-file").arg(env_file);
        }
        cmd.current_dir(&project.project_dir);
        // 補間変数は子プロセスの環境としてのみ渡す
        cmd.envs(&project.variables);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// コマンドを実行し、stdout を返す
    async fn run(&self, mut cmd: Command, operation: &str) -> Result<String> {
        tracing::debug!(operation, "docker compose を実行します");

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ComposeError::CommandFailed {
                operation: operation.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl ComposeBackend for DockerCompose {
    async fn load_config(&self, project: &ResolvedProject) -> anyhow::Result<ComposeConfig> {
        let mut cmd = self.base_command(project);
        cmd.args(["config", "--format", "json"]);

        let stdout = self.run(cmd, "config").await?;
        let config: ComposeConfig = serde_json::from_str(&stdout).map_err(ComposeError::from)?;
        Ok(config)
    }

    async fn up(&self, project: &ResolvedProject, args: &UpArgs) -> anyhow::Result<()> {
        let mut cmd = self.base_command(project);
        cmd.args(["up", "--detach"]);
        if args.force_recreate {
            cmd.arg("--force-recreate");
        }
        if args.no_recreate {
            cmd.arg("--no-recreate");
        }
        if args.remove_orphans {
            cmd.arg("--remove-orphans");
        }
        if args.quiet_pull {
            cmd.arg("--quiet-pull");
        }
        if args.wait {
            cmd.arg("--wait");
            if let Some(timeout) = args.wait_timeout {
                cmd.arg("--wait-timeout").arg(timeout.as_secs().to_string());
            }
        }

        self.run(cmd, "up").await?;
        Ok(())
    }

    async fn down(&self, project: &ResolvedProject, args: &DownArgs) -> anyhow::Result<()> {
        let mut cmd = self.base_command(project);
        cmd.arg("down");
        if args.remove_volumes {
            cmd.arg("--volumes");
        }
        if args.remove_orphans {
            cmd.arg("--remove-orphans");
        }
        if let Some(timeout) = args.stop_timeout {
            cmd.arg("--timeout").arg(timeout.as_secs().to_string());
        }

        self.run(cmd, "down").await?;
        Ok(())
    }

    async fn pull(&self, project: &ResolvedProject, args: &PullArgs) -> anyhow::Result<()> {
        let mut cmd = self.base_command(project);
        cmd.arg("pull");
        if args.quiet {
            cmd.arg("--quiet");
        }

        self.run(cmd, "pull").await?;
        Ok(())
    }

    async fn build(&self, project: &ResolvedProject, args: &BuildArgs) -> anyhow::Result<()> {
        let mut cmd = self.base_command(project);
        cmd.arg("build");
        if args.no_cache {
            cmd.arg("--no-cache");
        }
        for service in &args.services {
            cmd.arg(service);
        }

        self.run(cmd, "build").await?;
        Ok(())
    }

    async fn query_status(
        &self,
        project: &ResolvedProject,
        service: Option<&str>,
    ) -> anyhow::Result<Vec<ServiceStatus>> {
        let statuses = docker::query_status(&self.docker, project, service).await?;
        Ok(statuses)
    }

    async fn stream_logs(
        &self,
        project: &ResolvedProject,
        service: Option<&str>,
        tail: usize,
        follow: bool,
    ) -> anyhow::Result<()> {
        docker::stream_logs(&self.docker, project, service, tail, follow).await?;
        Ok(())
    }
}
