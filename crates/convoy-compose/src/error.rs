use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(
        "Dockerに接続できません: {0}\n\nヒント:\n  • Dockerが起動しているか確認してください\n  • docker ps コマンドが正常に動作するか確認してください"
    )]
    DockerConnectionFailed(String),

    #[error(
        "docker compose が見つかりません\n\nヒント:\n  • Docker CLI と compose プラグインをインストールしてください\n  • docker compose version で確認できます"
    )]
    ComposeCliNotFound,

    #[error("docker compose {operation} が失敗しました:\n{stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("構成の JSON を解釈できません: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Docker APIエラー: {0}")]
    DockerApiError(String),

    #[error("コマンド実行エラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bollard::errors::Error> for ComposeError {
    fn from(err: bollard::errors::Error) -> Self {
        // 接続エラーの可能性をチェック
        let err_str = err.to_string();
        if err_str.contains("Connection refused") || err_str.contains("No such file or directory") {
            ComposeError::DockerConnectionFailed(err_str)
        } else {
            ComposeError::DockerApiError(err_str)
        }
    }
}

pub type Result<T> = std::result::Result<T, ComposeError>;
