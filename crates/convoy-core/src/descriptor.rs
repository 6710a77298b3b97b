//! スタック定義の所在
//!
//! どのマニフェストファイル・環境変数ファイル・作業ディレクトリが
//! ひとつのスタックを定義するかを表す値型と、そのパス解決。

use crate::error::{CoreError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// スタックの識別子と定義ファイルの所在
///
/// CLI フラグから実行ごとに構築される。不変であり、永続化されない。
#[derive(Debug, Clone, PartialEq)]
pub struct StackDescriptor {
    /// プロジェクト名
    pub name: String,
    /// マニフェストファイル（順序を保持）
    pub files: Vec<PathBuf>,
    /// 環境変数ファイル（任意）
    pub env_file: Option<PathBuf>,
    /// 作業ディレクトリの明示指定（任意）
    pub project_dir: Option<PathBuf>,
}

impl StackDescriptor {
    pub fn new(name: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            files,
            env_file: None,
            project_dir: None,
        }
    }

    pub fn with_env_file(mut self, env_file: impl Into<PathBuf>) -> Self {
        self.env_file = Some(env_file.into());
        self
    }

    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(project_dir.into());
        self
    }

    /// 作業ディレクトリを決定する
    ///
    /// 優先順位: 明示指定 > 最初のマニフェストの親ディレクトリ > カレントディレクトリ
    pub fn working_dir(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;

        if let Some(dir) = &self.project_dir {
            return Ok(resolve_path(&cwd, dir));
        }

        if let Some(first) = self.files.first() {
            let first = resolve_path(&cwd, first);
            let parent = first
                .parent()
                .ok_or_else(|| CoreError::WorkingDir {
                    path: first.clone(),
                    message: "親ディレクトリがありません".to_string(),
                })?
                .to_path_buf();
            return Ok(parent);
        }

        Ok(cwd)
    }

    /// パスを検証・解決して、バックエンド呼び出しに使える形へ変換する
    ///
    /// マニフェストが1つも無い場合はロード前にエラーとする。
    pub fn resolve(&self, variables: HashMap<String, String>) -> Result<ResolvedProject> {
        if self.files.is_empty() {
            return Err(CoreError::NoManifestFiles);
        }

        let project_dir = self.working_dir()?;

        let mut files = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let resolved = resolve_path(&project_dir, file);
            if !resolved.is_file() {
                return Err(CoreError::ManifestNotFound(resolved));
            }
            files.push(resolved);
        }

        let env_file = match &self.env_file {
            Some(path) => {
                let resolved = resolve_path(&project_dir, path);
                if !resolved.is_file() {
                    return Err(CoreError::EnvFileNotFound(resolved));
                }
                Some(resolved)
            }
            None => None,
        };

        Ok(ResolvedProject {
            name: self.name.clone(),
            files,
            env_file,
            project_dir,
            variables,
        })
    }
}

/// 解決済みプロジェクト
///
/// バックエンドが1回の呼び出しを組み立てるのに必要な情報一式。
/// `variables` はマニフェスト補間に渡す変数で、バックエンドが子プロセスの
/// 環境変数として適用する。オーケストレータ自身のプロセス環境は変更しない。
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProject {
    pub name: String,
    /// 絶対パスへ解決済みのマニフェストファイル
    pub files: Vec<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub project_dir: PathBuf,
    pub variables: HashMap<String, String>,
}

/// 相対パスを基準ディレクトリに対して解決する（絶対パスはそのまま）
fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_manifest(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "services: {}\n").unwrap();
        path
    }

    #[test]
    fn test_working_dir_prefers_explicit_project_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let descriptor = StackDescriptor::new("demo", vec![PathBuf::from("compose.yaml")])
            .with_project_dir(tmp.path());

        assert_eq!(descriptor.working_dir().unwrap(), tmp.path());
    }

    #[test]
    fn test_working_dir_falls_back_to_first_file_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = write_manifest(tmp.path(), "compose.yaml");
        let descriptor = StackDescriptor::new("demo", vec![manifest]);

        assert_eq!(descriptor.working_dir().unwrap(), tmp.path());
    }

    #[test]
    fn test_resolve_requires_manifest_files() {
        let descriptor = StackDescriptor::new("demo", vec![]);
        let err = descriptor.resolve(HashMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::NoManifestFiles));
    }

    #[test]
    fn test_resolve_relative_paths_against_project_dir() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "compose.yaml");
        write_manifest(tmp.path(), "compose.override.yaml");

        let descriptor = StackDescriptor::new(
            "demo",
            vec![
                PathBuf::from("compose.yaml"),
                PathBuf::from("compose.override.yaml"),
            ],
        )
        .with_project_dir(tmp.path());

        let project = descriptor.resolve(HashMap::new()).unwrap();
        assert_eq!(project.files[0], tmp.path().join("compose.yaml"));
        assert_eq!(project.files[1], tmp.path().join("compose.override.yaml"));
        assert!(project.files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn test_resolve_absolute_paths_pass_through() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = write_manifest(tmp.path(), "compose.yaml");

        let descriptor = StackDescriptor::new("demo", vec![manifest.clone()]);
        let project = descriptor.resolve(HashMap::new()).unwrap();
        assert_eq!(project.files, vec![manifest]);
    }

    #[test]
    fn test_resolve_missing_manifest_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let descriptor = StackDescriptor::new("demo", vec![PathBuf::from("nope.yaml")])
            .with_project_dir(tmp.path());

        let err = descriptor.resolve(HashMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::ManifestNotFound(_)));
    }

    #[test]
    fn test_resolve_missing_env_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "compose.yaml");

        let descriptor = StackDescriptor::new("demo", vec![PathBuf::from("compose.yaml")])
            .with_project_dir(tmp.path())
            .with_env_file(".env.production");

        let err = descriptor.resolve(HashMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::EnvFileNotFound(_)));
    }
}
