mod commands;
mod utils;

use clap::{Parser, Subcommand};
use utils::StackArgs;

#[derive(Parser)]
#[command(name = "convoy")]
#[command(about = "宣言したスタックを、そのまま動く環境へ。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 開発環境のスタックを操作
    #[command(subcommand)]
    Dev(DevCommands),
    /// 本番環境のスタックを操作
    #[command(subcommand)]
    Prod(ProdCommands),
    /// 実行環境をチェック
    Doctor,
    /// バージョン情報を表示
    Version,
}

#[derive(Subcommand)]
enum DevCommands {
    /// スタックを起動
    Up {
        #[command(flatten)]
        stack: StackArgs,
        /// 変更を適用せず計画だけ表示する
        #[arg(long)]
        dry_run: bool,
        /// 起動前に最新イメージをpullする
        #[arg(long)]
        pull: bool,
    },
    /// スタックを停止・削除
    Down {
        #[command(flatten)]
        stack: StackArgs,
        /// ボリュームも削除する
        #[arg(short, long)]
        volumes: bool,
    },
    /// イメージをビルド
    Build {
        #[command(flatten)]
        stack: StackArgs,
        /// ビルド対象のサービス（省略時は全サービス）
        #[arg(short = 'n', long)]
        service: Option<String>,
        /// 指定サービスの依存もあわせてビルドする
        #[arg(long)]
        with_dependencies: bool,
        /// キャッシュを使用しない
        #[arg(long)]
        no_cache: bool,
    },
    /// スタックの状態を表示
    Status {
        #[command(flatten)]
        stack: StackArgs,
    },
    /// コンテナのログを表示
    Logs {
        #[command(flatten)]
        stack: StackArgs,
        /// サービス名（省略時は全サービス）
        #[arg(short = 'n', long)]
        service: Option<String>,
        /// ログの行数を指定
        #[arg(short = 'l', long, default_value = "100")]
        lines: usize,
        /// ログをリアルタイムで追跡
        #[arg(long)]
        follow: bool,
    },
    /// 全サービスの準備完了を待つ
    Health {
        #[command(flatten)]
        stack: StackArgs,
    },
}

#[derive(Subcommand)]
enum ProdCommands {
    /// スタックをデプロイ（CI/CD向け）
    Deploy {
        #[command(flatten)]
        stack: StackArgs,
        /// デプロイするイメージタグ（省略時は IMAGE_TAG 環境変数）
        #[arg(long)]
        tag: Option<String>,
        /// 変更を適用せず計画だけ表示する
        #[arg(long)]
        dry_run: bool,
        /// イメージのpullをスキップ（デフォルトは常にpull）
        #[arg(long)]
        no_pull: bool,
    },
    /// 直前に記録されたデプロイへロールバック
    Rollback {
        #[command(flatten)]
        stack: StackArgs,
        /// 変更を適用せず計画だけ表示する
        #[arg(long)]
        dry_run: bool,
    },
    /// スタックの状態を表示
    Status {
        #[command(flatten)]
        stack: StackArgs,
    },
    /// コンテナのログを表示
    Logs {
        #[command(flatten)]
        stack: StackArgs,
        /// サービス名（省略時は全サービス）
        #[arg(short = 'n', long)]
        service: Option<String>,
        /// ログの行数を指定
        #[arg(short = 'l', long, default_value = "100")]
        lines: usize,
        /// ログをリアルタイムで追跡
        #[arg(long)]
        follow: bool,
    },
    /// 全サービスの準備完了を待つ
    Health {
        #[command(flatten)]
        stack: StackArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    // Versionコマンドはスタック設定不要
    if matches!(cli.command, Commands::Version) {
        println!("convoy {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match cli.command {
        Commands::Dev(dev) => match dev {
            DevCommands::Up {
                stack,
                dry_run,
                pull,
            } => {
                commands::up::handle(&stack, dry_run, pull).await?;
            }
            DevCommands::Down { stack, volumes } => {
                commands::down::handle(&stack, volumes).await?;
            }
            DevCommands::Build {
                stack,
                service,
                with_dependencies,
                no_cache,
            } => {
                commands::build::handle(&stack, service, with_dependencies, no_cache).await?;
            }
            DevCommands::Status { stack } => {
                commands::status::handle(&stack).await?;
            }
            DevCommands::Logs {
                stack,
                service,
                lines,
                follow,
            } => {
                commands::logs::handle(&stack, service, lines, follow).await?;
            }
            DevCommands::Health { stack } => {
                commands::health::handle(&stack, convoy_deploy::HealthWaitPolicy::fast()).await?;
            }
        },
        Commands::Prod(prod) => match prod {
            ProdCommands::Deploy {
                stack,
                tag,
                dry_run,
                no_pull,
            } => {
                commands::deploy::handle(&stack, tag, dry_run, no_pull).await?;
            }
            ProdCommands::Rollback { stack, dry_run } => {
                commands::rollback::handle(&stack, dry_run).await?;
            }
            ProdCommands::Status { stack } => {
                commands::status::handle(&stack).await?;
            }
            ProdCommands::Logs {
                stack,
                service,
                lines,
                follow,
            } => {
                commands::logs::handle(&stack, service, lines, follow).await?;
            }
            ProdCommands::Health { stack } => {
                commands::health::handle(&stack, convoy_deploy::HealthWaitPolicy::production())
                    .await?;
            }
        },
        Commands::Doctor => {
            commands::doctor::handle().await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before dispatch");
        }
    }

    Ok(())
}
