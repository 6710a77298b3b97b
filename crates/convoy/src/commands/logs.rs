use crate::utils::{self, StackArgs};
use colored::Colorize;
use convoy_compose::DockerCompose;
use convoy_core::ComposeBackend;
use std::collections::HashMap;

pub async fn handle(
    args: &StackArgs,
    service: Option<String>,
    lines: usize,
    follow: bool,
) -> anyhow::Result<()> {
    let descriptor = utils::build_descriptor(args)?;
    println!("{}", "ログを取得中...".blue());
    println!("スタック: {}", descriptor.name.cyan());
    println!();

    if follow {
        println!("{}", "Ctrl+C でログ追跡を終了".dimmed());
    }

    let backend = DockerCompose::connect().await?;
    let project = descriptor.resolve(HashMap::new())?;

    backend
        .stream_logs(&project, service.as_deref(), lines, follow)
        .await?;

    Ok(())
}
