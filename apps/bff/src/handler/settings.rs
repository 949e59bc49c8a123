//! # 設定 API ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/settings` - 設定マップを取得
//! - `PUT /api/settings` - 設定マップを丸ごと置き換え
//!
//! 設定はスキーマを持たない JSON オブジェクト。更新は部分マージではなく
//! 全置換のため、本文に含まれないキーは削除される。

use std::sync::Arc;

use axum::{
   Json,
   extract::{State, rejection::JsonRejection},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use eventive_domain::clock::Clock;
use eventive_shared::ApiResponse;

use crate::{
   client::{ProfileUpdate, SupabaseProfileClient},
   error::{ApiError, ErrorPolicy, log_and_convert_supabase_error},
   middleware::CurrentUser,
};

const PROFILE_NOT_FOUND: &str = "User not found";

/// 設定 API の共有状態
pub struct SettingsState {
   pub profile_client: Arc<dyn SupabaseProfileClient>,
   pub clock:          Arc<dyn Clock>,
   pub error_policy:   ErrorPolicy,
}

/// GET /api/settings
#[tracing::instrument(skip_all)]
pub async fn get_settings(
   State(state): State<Arc<SettingsState>>,
   CurrentUser(identity): CurrentUser,
) -> Result<Response, ApiError> {
   let settings = state
      .profile_client
      .get_settings(&identity.id)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("設定取得", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   Ok((StatusCode::OK, Json(ApiResponse::new(settings))).into_response())
}

/// PUT /api/settings
///
/// 本文は JSON オブジェクトでなければならない（配列・文字列などは 400）。
#[tracing::instrument(skip_all)]
pub async fn update_settings(
   State(state): State<Arc<SettingsState>>,
   CurrentUser(identity): CurrentUser,
   payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, ApiError> {
   let Json(body) = payload?;
   let serde_json::Value::Object(settings) = body else {
      return Err(ApiError::BadRequest(
         "Settings must be a JSON object".to_string(),
      ));
   };

   let update = ProfileUpdate::touch(state.clock.now()).with_settings(settings);
   let updated = state
      .profile_client
      .update_profile(&identity.id, &update)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("設定更新", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   Ok((StatusCode::OK, Json(ApiResponse::new(updated.settings))).into_response())
}
