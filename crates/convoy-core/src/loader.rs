//! マニフェストのロード
//!
//! パスを解決し、パースを外部バックエンドへ委譲して、
//! バックエンドの構成をこちらのモデルへ射影する。

use crate::backend::{ComposeBackend, ComposeConfig, ComposePort};
use crate::descriptor::StackDescriptor;
use crate::model::{BuildSpec, LoadedStack, Service};
use anyhow::Context;
use std::collections::{BTreeMap, HashMap};

/// スタック定義をロードする
///
/// `variables` はマニフェスト補間に渡す変数。エラー時に部分的なスタックは返さない。
pub async fn load_stack<B: ComposeBackend>(
    backend: &B,
    descriptor: &StackDescriptor,
    variables: HashMap<String, String>,
) -> anyhow::Result<LoadedStack> {
    let project = descriptor.resolve(variables)?;

    let config = backend
        .load_config(&project)
        .await
        .with_context(|| format!("スタック '{}' のマニフェストを読み込めません", project.name))?;

    let name = config.name.clone().unwrap_or_else(|| project.name.clone());
    let services = project_services(&config);

    tracing::info!(
        stack = %name,
        services = services.len(),
        "スタックをロードしました"
    );

    Ok(LoadedStack {
        name,
        services,
        project,
    })
}

/// バックエンドのサービスグラフを Service へ射影する
fn project_services(config: &ComposeConfig) -> BTreeMap<String, Service> {
    config
        .services
        .iter()
        .map(|(name, svc)| {
            let ports = svc.ports.iter().filter_map(format_port).collect();

            // 値が解決されなかった環境変数は落とす
            let environment = svc
                .environment
                .iter()
                .filter_map(|(key, value)| value.clone().map(|v| (key.clone(), v)))
                .collect();

            let depends_on = svc.depends_on.keys().cloned().collect();

            let build = svc.build.as_ref().map(|b| BuildSpec {
                context: b.context.clone().unwrap_or_else(|| ".".to_string()),
                dockerfile: b.dockerfile.clone(),
                args: b
                    .args
                    .iter()
                    .filter_map(|(key, value)| value.clone().map(|v| (key.clone(), v)))
                    .collect(),
            });

            let service = Service {
                image: svc.image.clone(),
                build,
                ports,
                environment,
                depends_on,
            };
            (name.clone(), service)
        })
        .collect()
}

/// 公開ポートとコンテナポートの両方が揃っている場合のみ整形する
fn format_port(port: &ComposePort) -> Option<String> {
    let published = port.published.as_deref().filter(|p| !p.is_empty())?;
    if port.target == 0 {
        return None;
    }
    let protocol = port.protocol.as_deref().unwrap_or("tcp");
    Some(format!("{}:{}/{}", published, port.target, protocol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        BuildArgs, ComposeBuild, ComposeService, DependsOn, DownArgs, PullArgs, ServiceStatus,
        UpArgs,
    };
    use crate::descriptor::ResolvedProject;
    use std::path::PathBuf;

    struct FixtureBackend {
        config: ComposeConfig,
    }

    impl ComposeBackend for FixtureBackend {
        async fn load_config(&self, _project: &ResolvedProject) -> anyhow::Result<ComposeConfig> {
            Ok(self.config.clone())
        }

        async fn up(&self, _project: &ResolvedProject, _args: &UpArgs) -> anyhow::Result<()> {
            unreachable!("ロードでは up は呼ばれない");
        }

        async fn down(&self, _project: &ResolvedProject, _args: &DownArgs) -> anyhow::Result<()> {
            unreachable!();
        }

        async fn pull(&self, _project: &ResolvedProject, _args: &PullArgs) -> anyhow::Result<()> {
            unreachable!();
        }

        async fn build(&self, _project: &ResolvedProject, _args: &BuildArgs) -> anyhow::Result<()> {
            unreachable!();
        }

        async fn query_status(
            &self,
            _project: &ResolvedProject,
            _service: Option<&str>,
        ) -> anyhow::Result<Vec<ServiceStatus>> {
            unreachable!();
        }

        async fn stream_logs(
            &self,
            _project: &ResolvedProject,
            _service: Option<&str>,
            _tail: usize,
            _follow: bool,
        ) -> anyhow::Result<()> {
            unreachable!();
        }
    }

    fn port(published: Option<&str>, target: u16, protocol: Option<&str>) -> ComposePort {
        ComposePort {
            target,
            published: published.map(str::to_string),
            protocol: protocol.map(str::to_string),
            mode: None,
        }
    }

    #[test]
    fn test_format_port_requires_published_and_target() {
        assert_eq!(
            format_port(&port(Some("8080"), 80, Some("tcp"))),
            Some("8080:80/tcp".to_string())
        );
        // 公開ポートなし
        assert_eq!(format_port(&port(None, 80, Some("tcp"))), None);
        assert_eq!(format_port(&port(Some(""), 80, Some("tcp"))), None);
        // コンテナポートなし
        assert_eq!(format_port(&port(Some("8080"), 0, Some("tcp"))), None);
        // プロトコル省略時は tcp
        assert_eq!(
            format_port(&port(Some("5432"), 5432, None)),
            Some("5432:5432/tcp".to_string())
        );
    }

    #[test]
    fn test_project_services_drops_unresolved_values() {
        let mut environment = BTreeMap::new();
        environment.insert("DATABASE_URL".to_string(), Some("postgres://db".to_string()));
        environment.insert("UNSET".to_string(), None);

        let mut args = BTreeMap::new();
        args.insert("VERSION".to_string(), Some("1.2.3".to_string()));
        args.insert("EMPTY".to_string(), None);

        let mut depends_on = BTreeMap::new();
        depends_on.insert("db".to_string(), DependsOn::default());

        let mut services = BTreeMap::new();
        services.insert(
            "api".to_string(),
            ComposeService {
                image: Some("ghcr.io/demo/api:v1".to_string()),
                build: Some(ComposeBuild {
                    context: None,
                    dockerfile: Some("Dockerfile".to_string()),
                    args,
                }),
                ports: vec![port(Some("8080"), 80, Some("tcp"))],
                environment,
                depends_on,
            },
        );

        let config = ComposeConfig {
            name: Some("demo".to_string()),
            services,
        };

        let projected = project_services(&config);
        let api = &projected["api"];

        assert_eq!(api.image.as_deref(), Some("ghcr.io/demo/api:v1"));
        assert_eq!(api.ports, vec!["8080:80/tcp".to_string()]);
        assert_eq!(api.environment.len(), 1);
        assert_eq!(
            api.environment.get("DATABASE_URL").map(String::as_str),
            Some("postgres://db")
        );
        assert_eq!(api.depends_on, vec!["db".to_string()]);

        let build = api.build.as_ref().unwrap();
        assert_eq!(build.context, ".");
        assert_eq!(build.args.len(), 1);
        assert_eq!(build.args.get("VERSION").map(String::as_str), Some("1.2.3"));
    }

    #[tokio::test]
    async fn test_load_stack_projects_backend_config() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("compose.yaml"), "services: {}\n").unwrap();

        let mut services = BTreeMap::new();
        services.insert(
            "web".to_string(),
            ComposeService {
                image: Some("nginx:1.27".to_string()),
                ..Default::default()
            },
        );

        let backend = FixtureBackend {
            config: ComposeConfig {
                name: Some("demo".to_string()),
                services,
            },
        };

        let descriptor = StackDescriptor::new("demo", vec![PathBuf::from("compose.yaml")])
            .with_project_dir(tmp.path());

        let stack = load_stack(&backend, &descriptor, HashMap::new())
            .await
            .unwrap();

        assert_eq!(stack.name, "demo");
        assert_eq!(stack.service_names(), vec!["web".to_string()]);
        assert_eq!(stack.project.project_dir, tmp.path());
    }

    #[tokio::test]
    async fn test_load_stack_fails_without_manifests() {
        let backend = FixtureBackend {
            config: ComposeConfig::default(),
        };
        let descriptor = StackDescriptor::new("demo", vec![]);

        let err = load_stack(&backend, &descriptor, HashMap::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("マニフェスト"));
    }
}
