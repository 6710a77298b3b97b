use anyhow::anyhow;
use clap::Args;
use convoy_core::StackDescriptor;
use convoy_deploy::TAG_VARIABLE;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// スタックの場所を指定する共通フラグ
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// プロジェクト名（省略時は作業ディレクトリ名）
    #[arg(short = 'p', long = "project-name", env = "CONVOY_PROJECT")]
    pub project: Option<String>,

    /// マニフェストファイル（カンマ区切りで複数指定可）
    #[arg(short = 'f', long = "file", value_delimiter = ',')]
    pub files: Vec<PathBuf>,

    /// 環境変数ファイル
    #[arg(long = "env-file")]
    pub env_file: Option<PathBuf>,

    /// 作業ディレクトリ
    #[arg(long = "project-dir")]
    pub project_dir: Option<PathBuf>,
}

/// フラグ省略時に探す既定のマニフェストファイル名
const DEFAULT_MANIFESTS: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// 共通フラグからスタックディスクリプタを組み立てる
pub fn build_descriptor(args: &StackArgs) -> anyhow::Result<StackDescriptor> {
    let cwd = std::env::current_dir()?;
    let base = match &args.project_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => cwd.join(dir),
        None => cwd,
    };

    let files = if args.files.is_empty() {
        vec![discover_manifest(&base)?]
    } else {
        args.files.clone()
    };

    let name = args
        .project
        .clone()
        .unwrap_or_else(|| default_project_name(&base));

    let mut descriptor = StackDescriptor::new(name, files);
    if let Some(env_file) = &args.env_file {
        descriptor = descriptor.with_env_file(env_file);
    }
    if let Some(dir) = &args.project_dir {
        descriptor = descriptor.with_project_dir(dir);
    }
    Ok(descriptor)
}

/// 既定のマニフェストファイルを探す
fn discover_manifest(dir: &Path) -> anyhow::Result<PathBuf> {
    for candidate in DEFAULT_MANIFESTS {
        let path = dir.join(candidate);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(anyhow!(
        "マニフェストファイルが見つかりません: {}\nヒント:\n  • -f/--file で compose ファイルを指定してください\n  • または compose.yaml を配置してください",
        dir.display()
    ))
}

/// ディレクトリ名から既定のプロジェクト名を導く
fn default_project_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "default".to_string())
}

/// デプロイに使うタグを決める
///
/// --tag が無ければ呼び出し側の IMAGE_TAG 環境変数にフォールバックする。
pub fn resolve_deploy_tag(flag: Option<String>) -> anyhow::Result<String> {
    flag.or_else(|| std::env::var(TAG_VARIABLE).ok())
        .ok_or_else(|| {
            anyhow!(
                "デプロイにはタグの指定が必要です\nヒント:\n  • --tag <TAG> を指定してください\n  • または {} 環境変数を設定してください",
                TAG_VARIABLE
            )
        })
}

/// デプロイのマニフェスト補間変数を組み立てる
///
/// 呼び出し側が IMAGE_TAG を設定していればそれを尊重して上書きしない
/// （バックエンドの子プロセスがそのまま継承する）。
pub fn deploy_variables(tag: &str) -> HashMap<String, String> {
    let mut variables = HashMap::new();
    if std::env::var(TAG_VARIABLE).is_err() {
        variables.insert(TAG_VARIABLE.to_string(), tag.to_string());
    }
    variables
}
