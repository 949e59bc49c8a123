//! Supabase クライアントのエラー型

use thiserror::Error;

/// Supabase クライアントエラー
#[derive(Debug, Clone, Error)]
pub enum SupabaseError {
   /// トークンが拒否された（401 / 403、またはサブジェクトなし）
   #[error("トークンが無効です")]
   InvalidToken,

   /// 対象の行が存在しない（空配列）
   #[error("プロフィールが見つかりません")]
   NotFound,

   /// リモートがリクエストを拒否した（400 / 409 / 422）
   #[error("リクエストが拒否されました: {0}")]
   Rejected(String),

   /// ネットワークエラー（接続失敗・タイムアウト・デコード失敗）
   #[error("ネットワークエラー: {0}")]
   Network(String),

   /// 予期しないエラー
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

impl From<reqwest::Error> for SupabaseError {
   fn from(err: reqwest::Error) -> Self {
      if err.is_timeout() {
         return SupabaseError::Network(format!("タイムアウト: {err}"));
      }
      SupabaseError::Network(err.to_string())
   }
}
