use crate::utils::{self, StackArgs};
use colored::Colorize;
use convoy_compose::DockerCompose;

pub async fn handle(args: &StackArgs, dry_run: bool) -> anyhow::Result<()> {
    println!("{}", "ロールバックを開始します...".yellow().bold());

    let descriptor = utils::build_descriptor(args)?;
    println!("スタック: {}", descriptor.name.cyan());

    let backend = DockerCompose::connect().await?;
    convoy_deploy::rollback(&backend, &descriptor, dry_run).await?;

    if !dry_run {
        println!();
        println!("{}", "✓ ロールバック完了".green().bold());
    }

    Ok(())
}
