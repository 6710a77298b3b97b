//! ロード済みスタックのモデル

use crate::descriptor::ResolvedProject;
use std::collections::BTreeMap;

/// サービス1つ分の宣言済み設定
///
/// マニフェストから導出され、ロード後は不変。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Service {
    pub image: Option<String>,
    /// ビルド設定（image の代わり、または image と併用）
    pub build: Option<BuildSpec>,
    /// "公開ポート:コンテナポート/プロトコル" 形式
    pub ports: Vec<String>,
    /// 補間済みの環境変数。値が未設定のキーは含まない
    pub environment: BTreeMap<String, String>,
    /// 依存するサービス名
    pub depends_on: Vec<String>,
}

/// ビルド設定
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSpec {
    pub context: String,
    pub dockerfile: Option<String>,
    pub args: BTreeMap<String, String>,
}

/// パース・解決済みのスタック
///
/// 実行ごとに作られ、プロセス終了とともに破棄される。
#[derive(Debug, Clone)]
pub struct LoadedStack {
    pub name: String,
    pub services: BTreeMap<String, Service>,
    /// バックエンドへの後続呼び出しに使う解決済み情報
    pub project: ResolvedProject,
}

impl LoadedStack {
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }
}
