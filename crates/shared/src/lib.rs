//! # Eventive 共有ユーティリティ
//!
//! BFF とドメイン層から共通で使われる型を提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum への依存は持たない（`IntoResponse` 変換は BFF 側の責務）
//! - トレーシング初期化は `observability` feature でのみ有効化する

pub mod api_response;
pub mod error_response;
pub mod health;
pub mod observability;

pub use api_response::ApiResponse;
pub use error_response::{ErrorBody, ErrorResponse};
pub use health::HealthResponse;
