//! # Eventive BFF ライブラリ
//!
//! フロントエンド向け API サーバーのコアモジュール。
//! 永続化と認証は Supabase に委譲し、BFF はトークン検証・入力検証・
//! レスポンス整形を担う。
//!
//! ## モジュール構成
//!
//! - `app_builder`: State の組み立てとルーター構築
//! - `client`: Supabase（Auth / REST / Storage）クライアント
//! - `config`: 環境変数からの設定読み込み
//! - `error`: API エラーとレスポンス変換
//! - `handler`: HTTP ハンドラ
//! - `middleware`: 認証・レート制限・セキュリティヘッダー等

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
