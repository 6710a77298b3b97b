use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "マニフェストファイルが指定されていません\nヒント:\n  • -f/--file で compose ファイルを指定してください\n  • カンマ区切りで複数指定できます"
    )]
    NoManifestFiles,

    #[error("マニフェストファイルが見つかりません: {0}")]
    ManifestNotFound(PathBuf),

    #[error("環境変数ファイルが見つかりません: {0}")]
    EnvFileNotFound(PathBuf),

    #[error("作業ディレクトリを解決できません: {path}\n理由: {message}")]
    WorkingDir { path: PathBuf, message: String },

    #[error("サービスが見つかりません: {0}")]
    ServiceNotFound(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
