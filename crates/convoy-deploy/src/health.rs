//! ヘルス待機
//!
//! 対象サービスの観測値を、すべて準備完了になるか期限が切れるまで
//! ポーリングする。サービスは並行ではなく1つずつ順番に待つ。
//! バックエンドへの同時照会を抑え、どのサービスで詰まったかを
//! 明確に特定できるようにするため。

use crate::error::DeployError;
use anyhow::Context;
use convoy_core::{ComposeBackend, LoadedStack};
use rand::Rng;
use std::time::Duration;
use tokio::time::{self, Instant};

/// ポーリング1回あたりに加える揺らぎの上限（ミリ秒）
const JITTER_MAX_MS: u64 = 500;

/// ヘルス待機のパラメータ
#[derive(Debug, Clone, PartialEq)]
pub struct HealthWaitPolicy {
    /// 待機全体の期限
    pub timeout: Duration,
    /// ポーリング間隔
    pub poll_interval: Duration,
    /// 同時実行のポーリングをずらす揺らぎを入れるか
    pub jitter: bool,
}

impl HealthWaitPolicy {
    /// 開発向け: 60秒 / 2秒間隔
    pub fn fast() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            jitter: true,
        }
    }

    /// 本番向け: 120秒 / 3秒間隔
    pub fn production() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(3),
            jitter: true,
        }
    }

    /// ポーリングが成立しない設定を開始前に弾く
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.timeout.is_zero() {
            return Err(DeployError::InvalidWaitPolicy(
                "timeout は 0 より大きい必要があります".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(DeployError::InvalidWaitPolicy(
                "poll_interval は 0 より大きい必要があります".to_string(),
            ));
        }
        if self.poll_interval >= self.timeout {
            return Err(DeployError::InvalidWaitPolicy(format!(
                "poll_interval ({:?}) は timeout ({:?}) より短い必要があります",
                self.poll_interval, self.timeout
            )));
        }
        Ok(())
    }
}

/// 対象サービスがすべて準備完了になるまでブロックする
///
/// `services` が空ならスタックの全サービスを対象にする。期限はひとつの
/// デッドラインとして全体にかかり、超過した時点で待機中のサービス名を
/// 添えて失敗する。確認済みのサービスは再確認しない。
pub async fn wait_for_healthy<B: ComposeBackend>(
    backend: &B,
    stack: &LoadedStack,
    services: &[String],
    policy: &HealthWaitPolicy,
) -> anyhow::Result<()> {
    policy.validate()?;

    let targets = if services.is_empty() {
        stack.service_names()
    } else {
        services.to_vec()
    };

    let deadline = Instant::now() + policy.timeout;

    for name in &targets {
        match time::timeout_at(deadline, wait_for_service(backend, stack, name, policy)).await {
            Ok(result) => {
                result.with_context(|| format!("サービス '{}' の状態照会に失敗しました", name))?;
                tracing::info!(service = %name, "サービスが準備完了になりました");
            }
            Err(_) => {
                return Err(DeployError::HealthWaitTimeout {
                    service: name.clone(),
                    timeout_secs: policy.timeout.as_secs(),
                }
                .into());
            }
        }
    }

    Ok(())
}

/// 1サービス分のポーリングループ（期限は呼び出し側が切る）
async fn wait_for_service<B: ComposeBackend>(
    backend: &B,
    stack: &LoadedStack,
    service: &str,
    policy: &HealthWaitPolicy,
) -> anyhow::Result<()> {
    let mut ticker = time::interval(policy.poll_interval);

    loop {
        ticker.tick().await;

        if policy.jitter {
            time::sleep(jitter_delay()).await;
        }

        let statuses = backend.query_status(&stack.project, Some(service)).await?;

        match statuses.iter().find(|s| s.name == service) {
            Some(status) if status.is_ready() => return Ok(()),
            Some(status) => {
                tracing::debug!(
                    service,
                    state = %status.state,
                    health = ?status.health,
                    "まだ準備完了していません"
                );
            }
            None => {
                tracing::debug!(service, "コンテナがまだ存在しません");
            }
        }
    }
}

/// 0ms 以上 500ms 未満の一様乱数の待ち時間
fn jitter_delay() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..JITTER_MAX_MS))
}
