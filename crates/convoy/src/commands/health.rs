use crate::utils::{self, StackArgs};
use colored::Colorize;
use convoy_compose::DockerCompose;
use convoy_deploy::HealthWaitPolicy;
use std::collections::HashMap;

pub async fn handle(args: &StackArgs, policy: HealthWaitPolicy) -> anyhow::Result<()> {
    let descriptor = utils::build_descriptor(args)?;
    println!("{}", "サービスの準備完了を待機中...".blue());
    println!("スタック: {}", descriptor.name.cyan());

    let backend = DockerCompose::connect().await?;
    let stack = convoy_core::load_stack(&backend, &descriptor, HashMap::new()).await?;

    convoy_deploy::wait_for_healthy(&backend, &stack, &[], &policy).await?;

    println!();
    println!("{}", "✓ すべてのサービスが準備完了です！".green().bold());

    Ok(())
}
