//! テスト用のフェイクバックエンド
//!
//! 呼び出しを記録し、dry-run の純粋性やパラメータ変換を検証できるようにする。

use convoy_core::{
    BuildArgs, ComposeBackend, ComposeConfig, ComposeService, DownArgs, LoadedStack, PullArgs,
    ResolvedProject, Service, ServiceStatus, UpArgs,
};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

/// バックエンドへの呼び出し1件
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    LoadConfig { variables: HashMap<String, String> },
    Up(UpArgs),
    Down(DownArgs),
    Pull(PullArgs),
    Build(BuildArgs),
    QueryStatus { service: Option<String> },
    StreamLogs,
}

/// 呼び出し記録付きフェイクバックエンド
#[derive(Debug, Default)]
pub struct RecordingBackend {
    config: ComposeConfig,
    report_healthy: bool,
    fail_up: bool,
    calls: Mutex<Vec<Call>>,
}

impl RecordingBackend {
    /// 指定したサービス名を持つ構成を返すバックエンド
    pub fn with_services(names: &[&str]) -> Self {
        let mut services = BTreeMap::new();
        for name in names {
            services.insert(
                name.to_string(),
                ComposeService {
                    image: Some(format!("demo/{}:latest", name)),
                    ..Default::default()
                },
            );
        }
        Self {
            config: ComposeConfig {
                name: Some("demo".to_string()),
                services,
            },
            report_healthy: false,
            fail_up: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// query_status が常に healthy を返すようにする
    pub fn healthy(mut self) -> Self {
        self.report_healthy = true;
        self
    }

    /// up が必ず失敗するようにする
    pub fn failing_up(mut self) -> Self {
        self.fail_up = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ComposeBackend for RecordingBackend {
    async fn load_config(&self, project: &ResolvedProject) -> anyhow::Result<ComposeConfig> {
        self.record(Call::LoadConfig {
            variables: project.variables.clone(),
        });
        Ok(self.config.clone())
    }

    async fn up(&self, _project: &ResolvedProject, args: &UpArgs) -> anyhow::Result<()> {
        self.record(Call::Up(args.clone()));
        if self.fail_up {
            anyhow::bail!("up に失敗（テスト用）");
        }
        Ok(())
    }

    async fn down(&self, _project: &ResolvedProject, args: &DownArgs) -> anyhow::Result<()> {
        self.record(Call::Down(args.clone()));
        Ok(())
    }

    async fn pull(&self, _project: &ResolvedProject, args: &PullArgs) -> anyhow::Result<()> {
        self.record(Call::Pull(args.clone()));
        Ok(())
    }

    async fn build(&self, _project: &ResolvedProject, args: &BuildArgs) -> anyhow::Result<()> {
        self.record(Call::Build(args.clone()));
        Ok(())
    }

    async fn query_status(
        &self,
        _project: &ResolvedProject,
        service: Option<&str>,
    ) -> anyhow::Result<Vec<ServiceStatus>> {
        self.record(Call::QueryStatus {
            service: service.map(str::to_string),
        });

        let names: Vec<String> = match service {
            Some(service) => vec![service.to_string()],
            None => self.config.services.keys().cloned().collect(),
        };

        let statuses = names
            .into_iter()
            .map(|name| ServiceStatus {
                name,
                state: "running".to_string(),
                status: "Up".to_string(),
                health: Some(if self.report_healthy { "healthy" } else { "starting" }.to_string()),
                ports: Vec::new(),
                image: "demo:latest".to_string(),
            })
            .collect();
        Ok(statuses)
    }

    async fn stream_logs(
        &self,
        _project: &ResolvedProject,
        _service: Option<&str>,
        _tail: usize,
        _follow: bool,
    ) -> anyhow::Result<()> {
        self.record(Call::StreamLogs);
        Ok(())
    }
}

/// テスト用の LoadedStack を直接組み立てる
pub fn stack(names: &[&str]) -> LoadedStack {
    let mut services = BTreeMap::new();
    for name in names {
        services.insert(
            name.to_string(),
            Service {
                image: Some(format!("demo/{}:latest", name)),
                ..Default::default()
            },
        );
    }

    LoadedStack {
        name: "demo".to_string(),
        services,
        project: ResolvedProject {
            name: "demo".to_string(),
            files: vec![PathBuf::from("/tmp/compose.yaml")],
            env_file: None,
            project_dir: PathBuf::from("/tmp"),
            variables: HashMap::new(),
        },
    }
}
