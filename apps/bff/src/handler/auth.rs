//! # 認証プレースホルダ API
//!
//! OAuth コールバック・トークン更新・ログアウトはクライアント SDK が
//! Supabase と直接行う。BFF は固定メッセージを返すだけで、認証は要求しない。
//!
//! ## エンドポイント
//!
//! - `POST /api/auth/callback`
//! - `POST /api/auth/refresh` - `refreshToken` が必須
//! - `POST /api/auth/logout`

use axum::{
   Json,
   extract::rejection::JsonRejection,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use eventive_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// メッセージのみのレスポンスデータ
#[derive(Debug, Serialize)]
pub struct MessageData {
   pub message: &'static str,
}

fn message(message: &'static str) -> Response {
   (StatusCode::OK, Json(ApiResponse::new(MessageData { message }))).into_response()
}

/// トークン更新リクエスト
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
   #[serde(default)]
   pub refresh_token: Option<String>,
}

/// POST /api/auth/callback
pub async fn auth_callback() -> Response {
   message("OAuth callback handled by Supabase client SDK")
}

/// POST /api/auth/refresh
///
/// `refreshToken` がない、または空の場合は 400。
pub async fn refresh_token(
   payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
   let Json(req) = payload?;

   if req.refresh_token.is_none_or(|token| token.trim().is_empty()) {
      return Err(ApiError::BadRequest("Refresh token required".to_string()));
   }
   Ok(message("Token refresh handled by Supabase client SDK"))
}

/// POST /api/auth/logout
pub async fn logout() -> Response {
   message("Logged out successfully")
}
