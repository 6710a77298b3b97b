//! 調停コントローラ
//!
//! 実行中のコンテナ群を、ロード済みスタックの宣言へ一致させる。
//! dry-run ではバックエンドに一切触れず、適用計画の表示だけを行う。

use anyhow::Context;
use colored::Colorize;
use convoy_core::{
    BuildArgs, ComposeBackend, CoreError, DownArgs, LoadedStack, PullArgs, UpArgs,
};
use std::collections::BTreeSet;
use std::time::Duration;

/// 再作成ポリシー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecreatePolicy {
    /// 常に作り直す
    Always,
    /// 既存のコンテナには触れない
    Never,
    /// 存在しないものだけ作る
    #[default]
    Missing,
    /// 定義が変わったものだけ作り直す
    Diverged,
}

/// up 1回分の操作者意図
#[derive(Debug, Clone, PartialEq)]
pub struct UpOptions {
    pub recreate: RecreatePolicy,
    pub remove_orphans: bool,
    pub quiet_pull: bool,
    /// バックエンド側で起動完了を待つか
    pub wait: bool,
    pub wait_timeout_secs: u64,
    /// 計画の表示のみで、リソースに触れない
    pub dry_run: bool,
}

impl UpOptions {
    /// 開発向けプロファイル: 足りないものだけ作り、60秒待つ
    pub fn dev() -> Self {
        Self {
            recreate: RecreatePolicy::Missing,
            remove_orphans: false,
            quiet_pull: false,
            wait: true,
            wait_timeout_secs: 60,
            dry_run: false,
        }
    }

    /// 本番向けプロファイル: 差分を作り直し、孤児を削除し、120秒待つ
    pub fn prod() -> Self {
        Self {
            recreate: RecreatePolicy::Diverged,
            remove_orphans: true,
            quiet_pull: true,
            wait: true,
            wait_timeout_secs: 120,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// バックエンドの up パラメータへ変換する
    ///
    /// always は強制再作成、never / missing は既存コンテナを作り直さない指定、
    /// diverged はバックエンドの差分検出に委ねる。
    fn to_backend_args(&self) -> UpArgs {
        let (force_recreate, no_recreate) = match self.recreate {
            RecreatePolicy::Always => (true, false),
            RecreatePolicy::Never | RecreatePolicy::Missing => (false, true),
            RecreatePolicy::Diverged => (false, false),
        };

        UpArgs {
            force_recreate,
            no_recreate,
            remove_orphans: self.remove_orphans,
            quiet_pull: self.quiet_pull,
            wait: self.wait,
            wait_timeout: self
                .wait
                .then(|| Duration::from_secs(self.wait_timeout_secs)),
        }
    }
}

/// down 1回分の操作者意図
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownOptions {
    pub remove_volumes: bool,
    pub remove_orphans: bool,
    /// 停止待ち秒数。0 以下なら指定しない
    pub stop_timeout_secs: i64,
}

/// pull 1回分の操作者意図
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullOptions {
    pub quiet: bool,
}

/// build 1回分の操作者意図
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOptions {
    /// 空なら全サービス
    pub services: Vec<String>,
    /// 指定サービスの依存も対象に含める
    pub with_dependencies: bool,
    pub no_cache: bool,
}

/// スタックを宣言された状態へ起動・調停する
pub async fn up<B: ComposeBackend>(
    backend: &B,
    stack: &LoadedStack,
    options: &UpOptions,
) -> anyhow::Result<()> {
    if options.dry_run {
        print_plan(stack);
        return Ok(());
    }

    backend
        .up(&stack.project, &options.to_backend_args())
        .await
        .with_context(|| format!("スタック '{}' の起動に失敗しました", stack.name))?;

    tracing::info!(stack = %stack.name, "スタックを起動しました");
    Ok(())
}

/// スタックを停止・削除する
pub async fn down<B: ComposeBackend>(
    backend: &B,
    stack: &LoadedStack,
    options: &DownOptions,
) -> anyhow::Result<()> {
    let args = DownArgs {
        remove_volumes: options.remove_volumes,
        remove_orphans: options.remove_orphans,
        stop_timeout: (options.stop_timeout_secs > 0)
            .then(|| Duration::from_secs(options.stop_timeout_secs as u64)),
    };

    backend
        .down(&stack.project, &args)
        .await
        .with_context(|| format!("スタック '{}' の停止に失敗しました", stack.name))?;

    tracing::info!(stack = %stack.name, "スタックを停止しました");
    Ok(())
}

/// スタックのイメージを取得する
pub async fn pull<B: ComposeBackend>(
    backend: &B,
    stack: &LoadedStack,
    options: &PullOptions,
) -> anyhow::Result<()> {
    let args = PullArgs {
        quiet: options.quiet,
    };

    backend
        .pull(&stack.project, &args)
        .await
        .with_context(|| format!("スタック '{}' のイメージ取得に失敗しました", stack.name))?;

    tracing::info!(stack = %stack.name, "イメージを取得しました");
    Ok(())
}

/// スタックのイメージをビルドする
pub async fn build<B: ComposeBackend>(
    backend: &B,
    stack: &LoadedStack,
    options: &BuildOptions,
) -> anyhow::Result<()> {
    for name in &options.services {
        if !stack.services.contains_key(name) {
            return Err(CoreError::ServiceNotFound(name.clone()).into());
        }
    }

    let services = if options.with_dependencies && !options.services.is_empty() {
        expand_dependencies(stack, &options.services)
    } else {
        options.services.clone()
    };

    let args = BuildArgs {
        services,
        no_cache: options.no_cache,
    };

    backend
        .build(&stack.project, &args)
        .await
        .with_context(|| format!("スタック '{}' のビルドに失敗しました", stack.name))?;

    tracing::info!(stack = %stack.name, "イメージをビルドしました");
    Ok(())
}

/// 依存辺をたどって対象サービス集合を閉包まで広げる
fn expand_dependencies(stack: &LoadedStack, services: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut queue: Vec<&str> = services.iter().map(String::as_str).collect();

    while let Some(name) = queue.pop() {
        if !seen.insert(name.to_string()) {
            continue;
        }
        if let Some(service) = stack.services.get(name) {
            queue.extend(service.depends_on.iter().map(String::as_str));
        }
    }

    seen.into_iter().collect()
}

/// dry-run 時の適用計画を表示する
fn print_plan(stack: &LoadedStack) {
    println!();
    println!(
        "{}",
        format!("適用計画: スタック '{}' ({} サービス)", stack.name, stack.services.len()).bold()
    );

    for (name, service) in &stack.services {
        println!("  • {}", name.cyan());
        if let Some(build) = &service.build {
            let dockerfile = build.dockerfile.as_deref().unwrap_or("Dockerfile");
            println!("      build: {} ({})", build.context, dockerfile);
        } else if let Some(image) = &service.image {
            println!("      image: {}", image);
        } else {
            println!("      image: {}", "(未設定)".dimmed());
        }
        if !service.ports.is_empty() {
            println!("      ports: {}", service.ports.join(", "));
        }
        if !service.depends_on.is_empty() {
            println!("      depends_on: {}", service.depends_on.join(", "));
        }
    }

    println!();
    println!("{}", "（dry-run のため変更は行われていません）".yellow());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{Call, RecordingBackend};

    #[test]
    fn test_up_options_profiles() {
        let dev = UpOptions::dev();
        assert_eq!(dev.recreate, RecreatePolicy::Missing);
        assert!(!dev.remove_orphans);
        assert_eq!(dev.wait_timeout_secs, 60);

        let prod = UpOptions::prod();
        assert_eq!(prod.recreate, RecreatePolicy::Diverged);
        assert!(prod.remove_orphans);
        assert_eq!(prod.wait_timeout_secs, 120);
    }

    #[test]
    fn test_recreate_policy_translation() {
        let mut options = UpOptions::prod();

        options.recreate = RecreatePolicy::Always;
        let args = options.to_backend_args();
        assert!(args.force_recreate);
        assert!(!args.no_recreate);

        options.recreate = RecreatePolicy::Missing;
        let args = options.to_backend_args();
        assert!(!args.force_recreate);
        assert!(args.no_recreate);

        options.recreate = RecreatePolicy::Diverged;
        let args = options.to_backend_args();
        assert!(!args.force_recreate);
        assert!(!args.no_recreate);

        assert_eq!(args.wait_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_down_stop_timeout_omitted_when_non_positive() {
        for secs in [0, -1] {
            let options = DownOptions {
                stop_timeout_secs: secs,
                ..Default::default()
            };
            let timeout = (options.stop_timeout_secs > 0)
                .then(|| Duration::from_secs(options.stop_timeout_secs as u64));
            assert_eq!(timeout, None);
        }
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_the_backend() {
        let backend = RecordingBackend::with_services(&["api", "db"]);
        let stack = crate::testsupport::stack(&["api", "db"]);

        let options = UpOptions::prod().with_dry_run(true);
        up(&backend, &stack, &options).await.unwrap();

        assert_eq!(backend.call_count(), 0);

        // サービスが空でも、イメージ未設定でも成功する
        let empty = crate::testsupport::stack(&[]);
        up(&backend, &empty, &options).await.unwrap();
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_up_translates_options_to_backend_args() {
        let backend = RecordingBackend::with_services(&["api"]);
        let stack = crate::testsupport::stack(&["api"]);

        up(&backend, &stack, &UpOptions::prod()).await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Up(args) => {
                assert!(args.remove_orphans);
                assert!(args.wait);
                assert_eq!(args.wait_timeout, Some(Duration::from_secs(120)));
            }
            other => panic!("予期しない呼び出し: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_up_wraps_backend_errors() {
        let backend = RecordingBackend::with_services(&["api"]).failing_up();
        let stack = crate::testsupport::stack(&["api"]);

        let err = up(&backend, &stack, &UpOptions::dev()).await.unwrap_err();
        assert!(err.to_string().contains("起動に失敗"));
    }

    #[tokio::test]
    async fn test_down_translates_stop_timeout() {
        let backend = RecordingBackend::with_services(&["api"]);
        let stack = crate::testsupport::stack(&["api"]);

        let options = DownOptions {
            remove_volumes: true,
            remove_orphans: false,
            stop_timeout_secs: 30,
        };
        down(&backend, &stack, &options).await.unwrap();

        match &backend.calls()[0] {
            Call::Down(args) => {
                assert!(args.remove_volumes);
                assert_eq!(args.stop_timeout, Some(Duration::from_secs(30)));
            }
            other => panic!("予期しない呼び出し: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_build_rejects_unknown_service() {
        let backend = RecordingBackend::with_services(&["api"]);
        let stack = crate::testsupport::stack(&["api"]);

        let options = BuildOptions {
            services: vec!["ghost".to_string()],
            ..Default::default()
        };
        let err = build(&backend, &stack, &options).await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_build_expands_dependencies() {
        let backend = RecordingBackend::with_services(&["api", "db", "cache"]);
        let mut stack = crate::testsupport::stack(&["api", "db", "cache"]);
        stack.services.get_mut("api").unwrap().depends_on = vec!["db".to_string()];
        stack.services.get_mut("db").unwrap().depends_on = vec!["cache".to_string()];

        let options = BuildOptions {
            services: vec!["api".to_string()],
            with_dependencies: true,
            no_cache: false,
        };
        build(&backend, &stack, &options).await.unwrap();

        match &backend.calls()[0] {
            Call::Build(args) => {
                assert_eq!(
                    args.services,
                    vec!["api".to_string(), "cache".to_string(), "db".to_string()]
                );
            }
            other => panic!("予期しない呼び出し: {:?}", other),
        }
    }
}
