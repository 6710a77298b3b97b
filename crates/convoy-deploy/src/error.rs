use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error(
        "デプロイ履歴がありません: {0}\n\nヒント:\n  • ロールバックには少なくとも1回のデプロイ成功が必要です\n  • 先に convoy prod deploy --tag <TAG> を実行してください"
    )]
    NoDeploymentState(PathBuf),

    #[error(
        "サービス '{service}' が {timeout_secs} 秒以内に準備完了になりませんでした\n\nヒント:\n  • convoy prod logs -n {service} でログを確認してください\n  • ヘルスチェック定義と起動時間を見直してください"
    )]
    HealthWaitTimeout { service: String, timeout_secs: u64 },

    #[error("ヘルス待機の設定が不正です: {0}")]
    InvalidWaitPolicy(String),

    #[error("状態ファイルの読み書きエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("状態ファイルの JSON エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] convoy_core::CoreError),
}

pub type Result<T> = std::result::Result<T, DeployError>;
