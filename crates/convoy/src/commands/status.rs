use crate::utils::{self, StackArgs};
use colored::Colorize;
use convoy_compose::DockerCompose;
use convoy_core::ComposeBackend;
use std::collections::HashMap;

pub async fn handle(args: &StackArgs) -> anyhow::Result<()> {
    let descriptor = utils::build_descriptor(args)?;
    println!("{}", "コンテナの状態を取得中...".blue());
    println!("スタック: {}", descriptor.name.cyan());

    let backend = DockerCompose::connect().await?;
    let stack = convoy_core::load_stack(&backend, &descriptor, HashMap::new()).await?;

    let statuses = backend.query_status(&stack.project, None).await?;

    println!();
    if statuses.is_empty() {
        println!("{}", "実行中のコンテナはありません".dimmed());
    } else {
        convoy_deploy::print_status(&stack, &statuses);
    }

    Ok(())
}
