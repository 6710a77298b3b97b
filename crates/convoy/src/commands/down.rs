use crate::utils::{self, StackArgs};
use colored::Colorize;
use convoy_compose::DockerCompose;
use convoy_deploy::DownOptions;
use std::collections::HashMap;

pub async fn handle(args: &StackArgs, volumes: bool) -> anyhow::Result<()> {
    let descriptor = utils::build_descriptor(args)?;
    println!("{}", "スタックを停止中...".yellow());
    println!("スタック: {}", descriptor.name.cyan());

    let backend = DockerCompose::connect().await?;
    let stack = convoy_core::load_stack(&backend, &descriptor, HashMap::new()).await?;

    let options = DownOptions {
        remove_volumes: volumes,
        remove_orphans: false,
        stop_timeout_secs: 0,
    };
    convoy_deploy::down(&backend, &stack, &options).await?;

    println!();
    if volumes {
        println!(
            "{}",
            "✓ すべてのサービスとボリュームが削除されました！".green().bold()
        );
    } else {
        println!("{}", "✓ すべてのサービスが停止しました！".green().bold());
        println!(
            "{}",
            "  ボリュームも削除するには --volumes フラグを使用してください".dimmed()
        );
    }

    Ok(())
}
