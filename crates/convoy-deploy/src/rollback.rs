//! ロールバック
//!
//! 直前に記録されたデプロイのタグでスタックを再デプロイする。
//! 記録と現状の食い違いは警告にとどめ、復旧そのものは妨げない。

use crate::reconciler::{self, UpOptions};
use crate::state::{DeploymentRecord, StateStore};
use colored::Colorize;
use convoy_core::{ComposeBackend, StackDescriptor, load_stack};
use std::collections::HashMap;

/// マニフェスト補間でイメージタグを選択する変数名
pub const TAG_VARIABLE: &str = "IMAGE_TAG";

/// 記録されたタグでスタックを再デプロイする
///
/// デプロイ履歴が無ければ何も触らずに失敗する。
pub async fn rollback<B: ComposeBackend>(
    backend: &B,
    descriptor: &StackDescriptor,
    dry_run: bool,
) -> anyhow::Result<()> {
    let store = StateStore::for_descriptor(descriptor)?;
    let record = store.load().await?;

    println!(
        "対象: タグ {} ({} にデプロイ)",
        record.last_tag.cyan(),
        record.deployed_at.to_rfc3339()
    );

    if record.project_name != descriptor.name {
        println!(
            "  ⚠ {}",
            format!(
                "記録されたプロジェクト名 '{}' が現在の '{}' と異なります",
                record.project_name, descriptor.name
            )
            .yellow()
        );
        tracing::warn!(
            recorded = %record.project_name,
            current = %descriptor.name,
            "プロジェクト名が一致しません"
        );
    }

    // 記録されたタグを補間変数として固定し、そのタグでロードし直す
    let mut variables = HashMap::new();
    variables.insert(TAG_VARIABLE.to_string(), record.last_tag.clone());
    let stack = load_stack(backend, descriptor, variables).await?;

    // マニフェスト側のドリフトは警告のみ
    for service in &record.services {
        if !stack.services.contains_key(service) {
            println!(
                "  ⚠ {}",
                format!(
                    "記録されたサービス '{}' は現在のマニフェストに存在しません",
                    service
                )
                .yellow()
            );
            tracing::warn!(service = %service, "記録されたサービスが現在の定義にありません");
        }
    }

    reconciler::up(backend, &stack, &UpOptions::prod().with_dry_run(dry_run)).await?;

    if !dry_run {
        // ロールバックもひとつのデプロイとして記録する（1段階の undo）
        let new_record = DeploymentRecord::capture(descriptor, &stack, &record.last_tag);
        if let Err(e) = store.save(&new_record).await {
            tracing::warn!(error = %e, "デプロイ記録の保存に失敗しました（ロールバック自体は成功）");
        }
        tracing::info!(stack = %stack.name, tag = %record.last_tag, "ロールバックが完了しました");
    }

    Ok(())
}
