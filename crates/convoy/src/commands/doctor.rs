use colored::Colorize;
use convoy_compose::{DockerCompose, docker};

pub async fn handle() -> anyhow::Result<()> {
    println!("{}", "実行環境をチェックします...".blue());
    println!();

    let mut ok = true;

    match docker::connect().await {
        Ok(_) => {
            println!("  {} Docker デーモンに接続できます", "✓".green());
        }
        Err(e) => {
            ok = false;
            println!("  {} Docker デーモンに接続できません", "✗".red());
            println!("    {}", e);
        }
    }

    match DockerCompose::check_available().await {
        Ok(version) => {
            println!(
                "  {} docker compose が利用可能です (v{})",
                "✓".green(),
                version
            );
        }
        Err(e) => {
            ok = false;
            println!("  {} docker compose が見つかりません", "✗".red());
            println!("    {}", e);
        }
    }

    println!();
    if ok {
        println!("{}", "✓ 問題は見つかりませんでした！".green().bold());
        Ok(())
    } else {
        eprintln!(
            "{}",
            "✗ 問題が見つかりました。上記のヒントを確認してください".red().bold()
        );
        std::process::exit(1);
    }
}
