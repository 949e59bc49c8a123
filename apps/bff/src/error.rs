//! # BFF エラーハンドリング
//!
//! HTTP API のエラー定義と、axum レスポンスへの変換。
//!
//! すべての失敗レスポンスは `{ "success": false, "error": { "message": ... } }`
//! の形式で返す。リモートの応答内容はクライアントに渡さず、開発環境でのみ
//! `error.detail` に内部エラーの文字列を載せる。

use axum::{
   Json,
   extract::{
      multipart::{MultipartError, MultipartRejection},
      rejection::JsonRejection,
   },
   http::{HeaderValue, StatusCode, header},
   response::{IntoResponse, Response},
};
use eventive_domain::AvatarError;
use eventive_shared::ErrorResponse;
use thiserror::Error;

use crate::{client::SupabaseError, config::AppEnv};

/// 内部エラー詳細の公開方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorPolicy {
   /// `error.detail` に内部エラーを含めるか
   pub expose_detail: bool,
}

impl ErrorPolicy {
   pub fn for_env(app_env: AppEnv) -> Self {
      Self {
         expose_detail: app_env.is_development(),
      }
   }

   /// 公開方針に従って内部エラーの詳細を返す
   fn detail(self, err: &impl std::fmt::Display) -> Option<String> {
      self.expose_detail.then(|| err.to_string())
   }
}

/// BFF 層で発生するエラー
///
/// `IntoResponse` を実装しているため、ハンドラは `Result<Response, ApiError>` を返せる。
/// `Display` の文言がそのまま `error.message` になる。
#[derive(Debug, Error)]
pub enum ApiError {
   /// 401 Unauthorized
   #[error("{0}")]
   Unauthenticated(&'static str),

   /// 403 Forbidden
   #[error("{0}")]
   Forbidden(String),

   /// 404 Not Found
   #[error("{0}")]
   NotFound(String),

   /// 400 Bad Request
   #[error("{0}")]
   BadRequest(String),

   /// 429 Too Many Requests
   #[error("Too many requests, please try again later")]
   TooManyRequests { retry_after_secs: u64 },

   /// 500 Internal Server Error
   #[error("Internal Server Error")]
   Internal { detail: Option<String> },
}

impl ApiError {
   /// `Authorization` ヘッダーがない
   pub fn missing_token() -> Self {
      Self::Unauthenticated("No authorization token provided")
   }

   /// トークンが拒否された
   pub fn invalid_token() -> Self {
      Self::Unauthenticated("Invalid or expired token")
   }

   /// 未知のルート
   pub fn route_not_found() -> Self {
      Self::NotFound("Route not found".to_string())
   }

   pub fn status(&self) -> StatusCode {
      match self {
         Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
         Self::Forbidden(_) => StatusCode::FORBIDDEN,
         Self::NotFound(_) => StatusCode::NOT_FOUND,
         Self::BadRequest(_) => StatusCode::BAD_REQUEST,
         Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
         Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
      }
   }
}

impl IntoResponse for ApiError {
   fn into_response(self) -> Response {
      let status = self.status();
      let mut body = ErrorResponse::new(self.to_string());

      match self {
         ApiError::Internal {
            detail: Some(detail),
         } => {
            body = body.with_detail(detail);
         }
         ApiError::TooManyRequests { retry_after_secs } => {
            let mut response = (status, Json(body)).into_response();
            response
               .headers_mut()
               .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            return response;
         }
         _ => {}
      }

      (status, Json(body)).into_response()
   }
}

impl From<AvatarError> for ApiError {
   fn from(err: AvatarError) -> Self {
      ApiError::BadRequest(err.to_string())
   }
}

impl From<JsonRejection> for ApiError {
   fn from(rejection: JsonRejection) -> Self {
      tracing::debug!("JSON ボディの読み取りに失敗: {}", rejection.body_text());
      ApiError::BadRequest("Invalid JSON body".to_string())
   }
}

impl From<MultipartRejection> for ApiError {
   fn from(rejection: MultipartRejection) -> Self {
      tracing::debug!("multipart の読み取りに失敗: {}", rejection.body_text());
      ApiError::BadRequest("Invalid multipart body".to_string())
   }
}

impl From<MultipartError> for ApiError {
   fn from(err: MultipartError) -> Self {
      tracing::debug!("multipart の読み取りに失敗: {}", err.body_text());
      ApiError::BadRequest("Invalid multipart body".to_string())
   }
}

/// Supabase エラーをログ付きで API エラーに変換する
///
/// `Network`/`Unexpected` エラーの場合はコンテキスト付きで `tracing::error!` を出力する。
/// `NotFound` は `not_found_message` を使った 404 になる。
pub fn log_and_convert_supabase_error(
   context: &str,
   err: SupabaseError,
   policy: ErrorPolicy,
   not_found_message: &str,
) -> ApiError {
   match err {
      SupabaseError::NotFound => ApiError::NotFound(not_found_message.to_string()),
      SupabaseError::InvalidToken => ApiError::invalid_token(),
      SupabaseError::Rejected(ref body) => {
         tracing::warn!(
            error.category = "external_service",
            error.kind = "rejected",
            "{}でリクエストが拒否されました: {}",
            context,
            body
         );
         ApiError::BadRequest("Request rejected by backend".to_string())
      }
      SupabaseError::Network(_) | SupabaseError::Unexpected(_) => {
         tracing::error!(
            error.category = "external_service",
            error.kind = "service_communication",
            "{}で内部エラー: {}",
            context,
            err
         );
         ApiError::Internal {
            detail: policy.detail(&err),
         }
      }
   }
}

/// 未知のルートに対するフォールバックハンドラ
pub async fn route_not_found() -> ApiError {
   ApiError::route_not_found()
}

#[cfg(test)]
mod tests {
   use axum::body::to_bytes;
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   async fn body_json(response: Response) -> serde_json::Value {
      let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      serde_json::from_slice(&bytes).unwrap()
   }

   #[rstest]
   #[case(ApiError::missing_token(), StatusCode::UNAUTHORIZED)]
   #[case(ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN)]
   #[case(ApiError::route_not_found(), StatusCode::NOT_FOUND)]
   #[case(ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST)]
   #[case(ApiError::TooManyRequests { retry_after_secs: 1 }, StatusCode::TOO_MANY_REQUESTS)]
   #[case(ApiError::Internal { detail: None }, StatusCode::INTERNAL_SERVER_ERROR)]
   fn test_各エラーが対応するステータスになる(#[case] error: ApiError, #[case] expected: StatusCode) {
      assert_eq!(error.into_response().status(), expected);
   }

   #[tokio::test]
   async fn test_エラーレスポンスはエンベロープ形式になる() {
      let response = ApiError::NotFound("Profile not found".to_string()).into_response();

      assert_eq!(
         body_json(response).await,
         serde_json::json!({
            "success": false,
            "error": { "message": "Profile not found" }
         })
      );
   }

   #[tokio::test]
   async fn test_too_many_requestsはretry_afterヘッダーを付与する() {
      let response = ApiError::TooManyRequests {
         retry_after_secs: 42,
      }
      .into_response();

      assert_eq!(response.headers()[header::RETRY_AFTER], "42");
      let json = body_json(response).await;
      assert_eq!(
         json["error"]["message"],
         "Too many requests, please try again later"
      );
   }

   #[tokio::test]
   async fn test_開発環境では内部エラーの詳細を返す() {
      let policy = ErrorPolicy::for_env(AppEnv::Development);

      let error = log_and_convert_supabase_error(
         "プロフィール取得",
         SupabaseError::Network("connection refused".to_string()),
         policy,
         "Profile not found",
      );
      let json = body_json(error.into_response()).await;

      assert_eq!(json["error"]["message"], "Internal Server Error");
      assert!(
         json["error"]["detail"]
            .as_str()
            .unwrap()
            .contains("connection refused")
      );
   }

   #[tokio::test]
   async fn test_本番環境では内部エラーの詳細を隠す() {
      let policy = ErrorPolicy::for_env(AppEnv::Production);

      let error = log_and_convert_supabase_error(
         "プロフィール取得",
         SupabaseError::Unexpected("予期しないステータス 503: upstream".to_string()),
         policy,
         "Profile not found",
      );
      let json = body_json(error.into_response()).await;

      assert!(json["error"].get("detail").is_none());
      assert!(!json.to_string().contains("upstream"));
   }

   #[test]
   fn test_not_foundは指定したメッセージの404になる() {
      let error = log_and_convert_supabase_error(
         "設定取得",
         SupabaseError::NotFound,
         ErrorPolicy::default(),
         "Profile not found",
      );

      assert!(matches!(error, ApiError::NotFound(ref m) if m == "Profile not found"));
   }

   #[test]
   fn test_rejectedはリモートの本文を含まない400になる() {
      let error = log_and_convert_supabase_error(
         "プロフィール更新",
         SupabaseError::Rejected(r#"{"code":"23505","details":"secret"}"#.to_string()),
         ErrorPolicy {
            expose_detail: true,
         },
         "Profile not found",
      );

      assert_eq!(error.status(), StatusCode::BAD_REQUEST);
      assert!(!error.to_string().contains("secret"));
   }

   #[test]
   fn test_avatar_errorは400になる() {
      let error: ApiError = AvatarError::Missing.into();

      assert_eq!(error.status(), StatusCode::BAD_REQUEST);
      assert_eq!(error.to_string(), "No file provided");
   }
}
