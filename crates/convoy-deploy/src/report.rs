//! スタック状態の表形式レポート

use colored::Colorize;
use convoy_core::{LoadedStack, ServiceStatus};

/// ロード済みスタックと実測値を表にして出力する
///
/// スタックに定義されているが実体の無いサービスは「未作成」として表示する。
pub fn print_status(stack: &LoadedStack, statuses: &[ServiceStatus]) {
    println!(
        "{}",
        format!(
            "{:<20} {:<12} {:<22} {:<32} {}",
            "SERVICE", "STATE", "STATUS", "IMAGE", "PORTS"
        )
        .bold()
    );
    println!("{}", "─".repeat(100).dimmed());

    for (name, service) in &stack.services {
        match statuses.iter().find(|status| status.name == *name) {
            Some(status) => {
                let state_colored = if status.state == "running" {
                    status.state.green()
                } else {
                    status.state.red()
                };

                println!(
                    "{:<20} {:<12} {:<22} {:<32} {}",
                    name.cyan(),
                    state_colored,
                    status.status,
                    status.image,
                    status.ports.join(", ").dimmed()
                );
            }
            None => {
                println!(
                    "{:<20} {:<12} {:<22} {:<32} {}",
                    name.cyan(),
                    "-".dimmed(),
                    "(未作成)".dimmed(),
                    service.image.as_deref().unwrap_or("-"),
                    ""
                );
            }
        }
    }
}
