//! # ハンドラモジュール
//!
//! BFF の HTTP ハンドラを定義する。
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェックと API 一覧
//! - `auth`: 認証フローのプレースホルダ（実体はクライアント SDK 側）
//! - `user`: プロフィール（本人・公開）
//! - `settings`: 設定マップ
//! - `upload`: アバター画像

pub mod auth;
pub mod health;
pub mod settings;
pub mod upload;
pub mod user;

pub use auth::{auth_callback, logout, refresh_token};
pub use health::{HealthState, api_docs, health_check};
pub use settings::{SettingsState, get_settings, update_settings};
pub use upload::{UploadState, delete_avatar, upload_avatar};
pub use user::{UserState, get_me, get_public_profile, update_me};
