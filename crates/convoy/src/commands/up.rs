use crate::utils::{self, StackArgs};
use colored::Colorize;
use convoy_compose::DockerCompose;
use convoy_deploy::{PullOptions, UpOptions};
use std::collections::HashMap;

pub async fn handle(args: &StackArgs, dry_run: bool, pull: bool) -> anyhow::Result<()> {
    let descriptor = utils::build_descriptor(args)?;
    println!("スタック: {}", descriptor.name.cyan());

    let backend = DockerCompose::connect().await?;
    let stack = convoy_core::load_stack(&backend, &descriptor, HashMap::new()).await?;

    println!();
    println!(
        "{}",
        format!("サービス一覧 ({} 個):", stack.services.len()).bold()
    );
    for name in stack.services.keys() {
        println!("  • {}", name.cyan());
    }

    if pull && !dry_run {
        println!();
        println!("{}", "最新イメージを取得中...".blue());
        convoy_deploy::pull(&backend, &stack, &PullOptions::default()).await?;
        println!("  ✓ イメージの取得完了");
    }

    if !dry_run {
        println!();
        println!("{}", "スタックを起動中...".blue());
    }
    convoy_deploy::up(&backend, &stack, &UpOptions::dev().with_dry_run(dry_run)).await?;

    if !dry_run {
        println!();
        println!("{}", "✓ すべてのサービスが起動しました！".green().bold());
    }

    Ok(())
}
