//! Supabase レスポンスの共通ハンドリング

use serde::de::DeserializeOwned;

use super::error::SupabaseError;

/// Supabase レスポンスの共通ハンドリング
///
/// 成功時はレスポンスボディを `T` にデシリアライズし、
/// エラー時はステータスコードに応じた `SupabaseError` を返す。
///
/// サービスロールキーでの呼び出しが 401 / 403 になるのは設定不備のため、
/// `InvalidToken` ではなく `Unexpected` として扱う。
pub(super) async fn handle_response<T: DeserializeOwned>(
   response: reqwest::Response,
) -> Result<T, SupabaseError> {
   let response = check_status(response).await?;
   let body = response.json::<T>().await?;
   Ok(body)
}

/// ボディを読まずにステータスのみ検証する
pub(super) async fn handle_empty_response(response: reqwest::Response) -> Result<(), SupabaseError> {
   check_status(response).await.map(|_| ())
}

/// PostgREST の配列レスポンスから先頭行を取り出す
///
/// `id=eq.{id}` での検索は 0 件か 1 件のため、空配列は `NotFound` とする。
pub(super) fn first_row<T>(rows: Vec<T>) -> Result<T, SupabaseError> {
   rows.into_iter().next().ok_or(SupabaseError::NotFound)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
   let status = response.status();

   if status.is_success() {
      return Ok(response);
   }

   let body = response.text().await.unwrap_or_default();

   let error = match status {
      reqwest::StatusCode::BAD_REQUEST
      | reqwest::StatusCode::CONFLICT
      | reqwest::StatusCode::UNPROCESSABLE_ENTITY => SupabaseError::Rejected(body),
      _ => SupabaseError::Unexpected(format!("予期しないステータス {}: {}", status, body)),
   };

   Err(error)
}
