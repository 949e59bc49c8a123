//! # Supabase クライアント
//!
//! BFF から Supabase（GoTrue / PostgREST / Storage）への通信を担当する。
//!
//! ## エンドポイント
//!
//! - `GET /auth/v1/user` - アクセストークンの検証
//! - `GET /rest/v1/profiles?id=eq.{id}` - プロフィール行の取得
//! - `PATCH /rest/v1/profiles?id=eq.{id}` - プロフィール行の更新
//! - `POST /storage/v1/object/{bucket}/{path}` - オブジェクトのアップロード（upsert）
//! - `DELETE /storage/v1/object/{bucket}` - オブジェクトの削除
//!
//! ## モジュール構成
//!
//! サブトレイトごとにファイルを分け、ハンドラは必要なサブトレイトだけに依存する。

mod auth_client;
mod client_impl;
mod error;
mod profile_client;
mod response;
mod storage_client;
mod types;

pub use auth_client::SupabaseAuthClient;
pub use client_impl::{SupabaseClient, SupabaseClientImpl};
pub use error::SupabaseError;
pub use profile_client::SupabaseProfileClient;
pub use storage_client::SupabaseStorageClient;
pub use types::{AuthUser, ProfileUpdate};
