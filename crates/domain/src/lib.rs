//! # Eventive ドメイン層
//!
//! BFF が扱うリモートエンティティの射影と、ローカルで完結する検証ルールを定義する。
//!
//! ## 設計方針
//!
//! 永続化されるデータはすべてリモートバックエンドが所有する。
//! このクレートはその「リクエスト 1 回分の射影」と、リモート呼び出し前に
//! 判定できるルール（アバターのサイズ・MIME タイプ、部分更新のマージ）だけを持つ。
//!
//! ## 依存関係の方向
//!
//! ```text
//! bff → domain
//! bff → shared
//! ```
//!
//! ドメイン層は HTTP やリモートクライアントに一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`avatar`] - アバターアップロードの検証とオブジェクトキー
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメインエラー
//! - [`identity`] - リクエスト単位の認証済みユーザー
//! - [`profile`] - プロフィールと設定マップ

pub mod avatar;
pub mod clock;
pub mod error;
pub mod identity;
pub mod profile;

pub use error::AvatarError;
