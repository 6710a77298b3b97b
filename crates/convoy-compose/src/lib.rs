//! docker compose バックエンドアダプタ
//!
//! 調停系の操作（config / up / down / pull / build）は compose CLI へ、
//! 状態照会とログ取得は Docker Engine API へ委譲します。

pub mod compose;
pub mod docker;
pub mod error;

pub use compose::*;
pub use error::*;
