//! # ミドルウェア
//!
//! BFF 用のミドルウェアを提供する。
//!
//! - [`auth`]: Bearer トークン認証と `CurrentUser` エクストラクタ
//! - [`rate_limit`]: 固定ウィンドウのレート制限
//! - [`request_id`]: Request ID のリモート呼び出しへの伝播
//! - [`security_headers`]: キャッシュ制御とセキュリティヘッダー

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{AuthState, CurrentUser, require_auth};
pub use rate_limit::{RateLimiter, rate_limit, rate_limit_unauthenticated};
pub use security_headers::security_headers;
