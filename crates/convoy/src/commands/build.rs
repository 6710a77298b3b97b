use crate::utils::{self, StackArgs};
use colored::Colorize;
use convoy_compose::DockerCompose;
use convoy_deploy::BuildOptions;
use std::collections::HashMap;

pub async fn handle(
    args: &StackArgs,
    service: Option<String>,
    with_dependencies: bool,
    no_cache: bool,
) -> anyhow::Result<()> {
    let descriptor = utils::build_descriptor(args)?;
    println!("スタック: {}", descriptor.name.cyan());

    let backend = DockerCompose::connect().await?;
    let stack = convoy_core::load_stack(&backend, &descriptor, HashMap::new()).await?;

    let options = BuildOptions {
        services: service.into_iter().collect(),
        with_dependencies,
        no_cache,
    };

    println!();
    if options.services.is_empty() {
        println!("{}", "全サービスをビルド中...".blue());
    } else {
        println!(
            "{}",
            format!("サービス {} をビルド中...", options.services.join(", ")).blue()
        );
    }

    convoy_deploy::build(&backend, &stack, &options).await?;

    println!();
    println!("{}", "✓ ビルド完了".green().bold());

    Ok(())
}
