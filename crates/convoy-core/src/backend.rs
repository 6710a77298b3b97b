//! 外部 compose バックエンドとの境界
//!
//! オーケストレーション側はコンテナランタイム API へ直接触れず、
//! 必ずこのトレイトを通す。テストではフェイク実装を注入する。

use crate::descriptor::ResolvedProject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// compose バックエンドの能力インターフェース
#[allow(async_fn_in_trait)]
pub trait ComposeBackend {
    /// マニフェストをパースし、正規化された構成を返す
    async fn load_config(&self, project: &ResolvedProject) -> anyhow::Result<ComposeConfig>;

    /// コンテナを宣言された状態へ作成・起動する
    async fn up(&self, project: &ResolvedProject, args: &UpArgs) -> anyhow::Result<()>;

    /// コンテナを停止・削除する
    async fn down(&self, project: &ResolvedProject, args: &DownArgs) -> anyhow::Result<()>;

    /// イメージを取得する
    async fn pull(&self, project: &ResolvedProject, args: &PullArgs) -> anyhow::Result<()>;

    /// イメージをビルドする
    async fn build(&self, project: &ResolvedProject, args: &BuildArgs) -> anyhow::Result<()>;

    /// 実行中サービスの状態を取得する（service 指定で1サービスに絞る）
    async fn query_status(
        &self,
        project: &ResolvedProject,
        service: Option<&str>,
    ) -> anyhow::Result<Vec<ServiceStatus>>;

    /// コンテナログを出力する
    async fn stream_logs(
        &self,
        project: &ResolvedProject,
        service: Option<&str>,
        tail: usize,
        follow: bool,
    ) -> anyhow::Result<()>;
}

/// up 呼び出しのパラメータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpArgs {
    pub force_recreate: bool,
    pub no_recreate: bool,
    pub remove_orphans: bool,
    pub quiet_pull: bool,
    pub wait: bool,
    pub wait_timeout: Option<Duration>,
}

/// down 呼び出しのパラメータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownArgs {
    pub remove_volumes: bool,
    pub remove_orphans: bool,
    /// 停止待ちの猶予。None なら指定しない
    pub stop_timeout: Option<Duration>,
}

/// pull 呼び出しのパラメータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullArgs {
    pub quiet: bool,
}

/// build 呼び出しのパラメータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildArgs {
    /// 空なら全サービス
    pub services: Vec<String>,
    pub no_cache: bool,
}

/// サービス1つの現在の観測値
///
/// 照会のたびに新しく取得され、キャッシュされない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceStatus {
    pub name: String,
    /// ライフサイクル状態（running / exited など）
    pub state: String,
    /// 人間向けの状態文字列（例: "Up 3 minutes (healthy)"）
    pub status: String,
    /// healthy / unhealthy / starting。ヘルスチェック未定義なら None
    pub health: Option<String>,
    pub ports: Vec<String>,
    pub image: String,
}

impl ServiceStatus {
    /// 準備完了とみなす条件
    ///
    /// ヘルスチェックがあれば healthy であること。無ければ running で十分。
    pub fn is_ready(&self) -> bool {
        match self.health.as_deref() {
            Some(health) => health == "healthy",
            None => self.state == "running",
        }
    }
}

/// `docker compose config --format json` の出力
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub services: BTreeMap<String, ComposeService>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeService {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub build: Option<ComposeBuild>,
    #[serde(default)]
    pub ports: Vec<ComposePort>,
    /// 値が未解決のキーは null で来る
    #[serde(default)]
    pub environment: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub depends_on: BTreeMap<String, DependsOn>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeBuild {
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub dockerfile: Option<String>,
    #[serde(default)]
    pub args: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposePort {
    /// コンテナ側ポート
    #[serde(default)]
    pub target: u16,
    /// ホスト側ポート。未公開なら欠落する
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependsOn {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_with_health_indicator() {
        let status = ServiceStatus {
            health: Some("healthy".to_string()),
            state: "running".to_string(),
            ..Default::default()
        };
        assert!(status.is_ready());

        let starting = ServiceStatus {
            health: Some("starting".to_string()),
            state: "running".to_string(),
            ..Default::default()
        };
        assert!(!starting.is_ready());
    }

    #[test]
    fn test_ready_without_healthcheck_requires_running() {
        let running = ServiceStatus {
            health: None,
            state: "running".to_string(),
            ..Default::default()
        };
        assert!(running.is_ready());

        let exited = ServiceStatus {
            health: None,
            state: "exited".to_string(),
            ..Default::default()
        };
        assert!(!exited.is_ready());
    }
}
