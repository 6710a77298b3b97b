//! Convoy のコアモデル
//!
//! スタック定義の所在（ディスクリプタ）、ロード済みスタックのモデル、
//! そして外部 compose バックエンドとの境界トレイトを提供します。

pub mod backend;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod model;

pub use backend::*;
pub use descriptor::*;
pub use error::*;
pub use loader::*;
pub use model::*;
