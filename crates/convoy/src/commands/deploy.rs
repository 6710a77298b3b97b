use crate::utils::{self, StackArgs};
use colored::Colorize;
use convoy_compose::DockerCompose;
use convoy_deploy::{DeploymentRecord, HealthWaitPolicy, PullOptions, StateStore, UpOptions};

pub async fn handle(
    args: &StackArgs,
    tag: Option<String>,
    dry_run: bool,
    no_pull: bool,
) -> anyhow::Result<()> {
    println!("{}", "デプロイを開始します...".blue().bold());

    // タグの解決はどの操作よりも先に行う
    let tag = utils::resolve_deploy_tag(tag)?;
    let descriptor = utils::build_descriptor(args)?;

    println!("スタック: {}", descriptor.name.cyan());
    println!("タグ: {}", tag.cyan());

    let backend = DockerCompose::connect().await?;
    let variables = utils::deploy_variables(&tag);
    let stack = convoy_core::load_stack(&backend, &descriptor, variables).await?;

    println!();
    println!(
        "{}",
        format!("デプロイ対象サービス ({} 個):", stack.services.len()).bold()
    );
    for (name, service) in &stack.services {
        let image = service.image.as_deref().unwrap_or("(イメージ未設定)");
        println!("  • {} ({})", name.cyan(), image);
    }

    if dry_run {
        convoy_deploy::up(&backend, &stack, &UpOptions::prod().with_dry_run(true)).await?;
        return Ok(());
    }

    // 1. イメージのpull（デフォルトで実行、--no-pullでスキップ）
    println!();
    if !no_pull {
        println!("{}", "【Step 1/3】最新イメージを取得中...".blue());
        convoy_deploy::pull(&backend, &stack, &PullOptions { quiet: true }).await?;
        println!("  ✓ イメージの取得完了");
    } else {
        println!("【Step 1/3】イメージpullをスキップ（--no-pull指定）");
    }

    // 2. 宣言された状態へ調停
    println!();
    println!("{}", "【Step 2/3】スタックを調停中...".green());
    convoy_deploy::up(&backend, &stack, &UpOptions::prod()).await?;
    println!("  ✓ 調停完了");

    // 3. 全サービスの準備完了を待機
    println!();
    println!("{}", "【Step 3/3】サービスの準備完了を待機中...".blue());
    convoy_deploy::wait_for_healthy(&backend, &stack, &[], &HealthWaitPolicy::production())
        .await?;
    println!("  ✓ すべてのサービスが準備完了");

    // デプロイ記録の保存失敗はデプロイ自体の失敗にはしない
    let store = StateStore::for_descriptor(&descriptor)?;
    let record = DeploymentRecord::capture(&descriptor, &stack, &tag);
    match store.save(&record).await {
        Ok(()) => {
            println!("  ✓ デプロイ記録を保存しました ({})", store.path().display());
        }
        Err(e) => {
            println!("  ⚠ デプロイ記録の保存に失敗しました: {}", e);
            tracing::warn!(error = %e, "デプロイ記録を保存できませんでした");
        }
    }

    println!();
    println!(
        "{}",
        format!("✓ デプロイ完了: タグ '{}'", tag).green().bold()
    );

    Ok(())
}
