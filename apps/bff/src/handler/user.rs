//! # プロフィール API ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/users/me` - 本人のプロフィール
//! - `PUT /api/users/me` - 本人のプロフィールを部分更新
//! - `GET /api/users/{id}` - 公開プロフィール（認証不要）
//!
//! 部分更新は `username` / `displayName` / `bio` のうち指定されたものだけを
//! 既存の値に上書きする。

use std::sync::Arc;

use axum::{
   Json,
   extract::{Path, State, rejection::JsonRejection},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use eventive_domain::{clock::Clock, profile::ProfilePatch};
use eventive_shared::ApiResponse;

use crate::{
   client::{ProfileUpdate, SupabaseProfileClient},
   error::{ApiError, ErrorPolicy, log_and_convert_supabase_error},
   middleware::CurrentUser,
};

const PROFILE_NOT_FOUND: &str = "User profile not found";

/// プロフィール API の共有状態
pub struct UserState {
   pub profile_client: Arc<dyn SupabaseProfileClient>,
   pub clock:          Arc<dyn Clock>,
   pub error_policy:   ErrorPolicy,
}

/// GET /api/users/me
#[tracing::instrument(skip_all)]
pub async fn get_me(
   State(state): State<Arc<UserState>>,
   CurrentUser(identity): CurrentUser,
) -> Result<Response, ApiError> {
   let profile = state
      .profile_client
      .get_profile(&identity.id)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("プロフィール取得", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   Ok((StatusCode::OK, Json(ApiResponse::new(profile))).into_response())
}

/// PUT /api/users/me
///
/// 現在のプロフィールを取得してからマージし、編集可能フィールドを書き戻す。
#[tracing::instrument(skip_all)]
pub async fn update_me(
   State(state): State<Arc<UserState>>,
   CurrentUser(identity): CurrentUser,
   payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Response, ApiError> {
   let Json(patch) = payload?;
   if patch.is_empty() {
      tracing::debug!(user_id = %identity.id, "更新対象のフィールドがないため updated_at のみ更新します");
   }

   let mut profile = state
      .profile_client
      .get_profile(&identity.id)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("プロフィール取得", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   profile.apply_patch(&patch, state.clock.now());

   let updated = state
      .profile_client
      .update_profile(&identity.id, &ProfileUpdate::editable_fields(&profile))
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("プロフィール更新", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   tracing::info!(user_id = %identity.id, "プロフィールを更新しました");
   Ok((StatusCode::OK, Json(ApiResponse::new(updated))).into_response())
}

/// GET /api/users/{id}
///
/// 本人が `settings.publicProfile = true` にしている場合のみ返す。
#[tracing::instrument(skip_all)]
pub async fn get_public_profile(
   State(state): State<Arc<UserState>>,
   Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
   let profile = state
      .profile_client
      .get_public_profile(&user_id)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("公開プロフィール取得", e, state.error_policy, "User not found")
      })?;

   if !profile.is_public() {
      return Err(ApiError::Forbidden("This profile is private".to_string()));
   }

   Ok((StatusCode::OK, Json(ApiResponse::new(profile))).into_response())
}
