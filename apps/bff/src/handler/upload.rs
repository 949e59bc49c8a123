//! # アバター API ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/uploads/avatar` - multipart でアバター画像をアップロード
//! - `DELETE /api/uploads/avatar` - 現在のアバターを削除
//!
//! ## アップロードの流れ
//!
//! 1. multipart の `file`（または `avatar`）フィールドを上限サイズまで読み込む
//! 2. サイズと MIME タイプを検証する（失敗時はリモートに一切触れない）
//! 3. 旧アバターのオブジェクトを削除する（失敗しても続行）
//! 4. 新しいオブジェクトをアップロードし、公開 URL をプロフィールに保存する

use std::sync::Arc;

use axum::{
   Json,
   extract::{Multipart, State, multipart::MultipartRejection},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use bytes::{Bytes, BytesMut};
use eventive_domain::{
   AvatarError,
   avatar::{AvatarObjectKey, object_key_from_public_url, validate_upload},
   clock::Clock,
   identity::Identity,
};
use eventive_shared::ApiResponse;
use serde::Serialize;

use crate::{
   client::{ProfileUpdate, SupabaseProfileClient, SupabaseStorageClient},
   error::{ApiError, ErrorPolicy, log_and_convert_supabase_error},
   middleware::CurrentUser,
};

const PROFILE_NOT_FOUND: &str = "User profile not found";
/// アップロード先（バケット）が存在しない
const STORAGE_NOT_FOUND: &str = "Avatar storage bucket not found";

/// multipart で受け付けるフィールド名
const FILE_FIELDS: [&str; 2] = ["file", "avatar"];

/// アバター API の共有状態
pub struct UploadState {
   pub profile_client: Arc<dyn SupabaseProfileClient>,
   pub storage_client: Arc<dyn SupabaseStorageClient>,
   pub clock:          Arc<dyn Clock>,
   pub error_policy:   ErrorPolicy,
   /// アバター用バケット名
   pub bucket:         String,
   /// アップロード上限（バイト）
   pub max_file_size:  u64,
}

/// アップロード結果
#[derive(Debug, Serialize)]
pub struct AvatarUrlData {
   pub url: String,
}

/// 削除結果
#[derive(Debug, Serialize)]
pub struct AvatarDeletedData {
   pub message: &'static str,
}

/// 読み込んだファイル
struct UploadedFile {
   file_name:    Option<String>,
   content_type: Option<String>,
   bytes:        Bytes,
}

/// POST /api/uploads/avatar
#[tracing::instrument(skip_all)]
pub async fn upload_avatar(
   State(state): State<Arc<UploadState>>,
   CurrentUser(identity): CurrentUser,
   multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
   let mut multipart = multipart?;
   let file = read_file_field(&mut multipart, state.max_file_size)
      .await?
      .ok_or(AvatarError::Missing)?;

   let content_type = validate_upload(
      file.bytes.len() as u64,
      state.max_file_size,
      file.content_type.as_deref(),
   )?;
   let key = AvatarObjectKey::generate(&identity.id, file.file_name.as_deref(), content_type);

   let profile = state
      .profile_client
      .get_profile(&identity.id)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("プロフィール取得", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   if let Some(previous_url) = profile.avatar_url.as_deref() {
      remove_previous_avatar(&state, &identity, previous_url).await;
   }

   state
      .storage_client
      .upload_object(&state.bucket, &key, content_type, file.bytes)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("アバターアップロード", e, state.error_policy, STORAGE_NOT_FOUND)
      })?;

   let url = state.storage_client.public_url(&state.bucket, &key);
   let update = ProfileUpdate::touch(state.clock.now()).with_avatar_url(Some(url.clone()));
   state
      .profile_client
      .update_profile(&identity.id, &update)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("アバター URL 保存", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   tracing::info!(user_id = %identity.id, key = %key, "アバターをアップロードしました");
   Ok((StatusCode::OK, Json(ApiResponse::new(AvatarUrlData { url }))).into_response())
}

/// DELETE /api/uploads/avatar
#[tracing::instrument(skip_all)]
pub async fn delete_avatar(
   State(state): State<Arc<UploadState>>,
   CurrentUser(identity): CurrentUser,
) -> Result<Response, ApiError> {
   let profile = state
      .profile_client
      .get_profile(&identity.id)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("プロフィール取得", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   let Some(avatar_url) = profile.avatar_url.as_deref() else {
      return Err(ApiError::BadRequest("No avatar to delete".to_string()));
   };
   remove_previous_avatar(&state, &identity, avatar_url).await;

   let update = ProfileUpdate::touch(state.clock.now()).with_avatar_url(None);
   state
      .profile_client
      .update_profile(&identity.id, &update)
      .await
      .map_err(|e| {
         log_and_convert_supabase_error("アバター URL 削除", e, state.error_policy, PROFILE_NOT_FOUND)
      })?;

   let data = AvatarDeletedData {
      message: "Avatar deleted successfully",
   };
   Ok((StatusCode::OK, Json(ApiResponse::new(data))).into_response())
}

/// 保存済みの公開 URL が指すオブジェクトを削除する
///
/// 失敗してもエラーにはせず、ログのみ出力する。
async fn remove_previous_avatar(state: &UploadState, identity: &Identity, avatar_url: &str) {
   let Some(key) = object_key_from_public_url(avatar_url, &state.bucket) else {
      tracing::debug!(
         user_id = %identity.id,
         "アバター URL がバケットを指していないため削除をスキップします"
      );
      return;
   };

   if let Err(e) = state.storage_client.remove_object(&state.bucket, &key).await {
      tracing::warn!(
         error.category = "external_service",
         error.kind = "storage_cleanup",
         user_id = %identity.id,
         key = %key,
         "旧アバターの削除に失敗しました: {}",
         e
      );
   }
}

/// multipart からファイルフィールドを 1 つ読み込む
///
/// 上限を超えた時点で読み込みを打ち切る。該当フィールドがなければ `None`。
async fn read_file_field(
   multipart: &mut Multipart,
   max_file_size: u64,
) -> Result<Option<UploadedFile>, ApiError> {
   while let Some(mut field) = multipart.next_field().await? {
      if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
         continue;
      }

      let file_name = field.file_name().map(str::to_string);
      let content_type = field.content_type().map(str::to_string);

      let mut buffer = BytesMut::new();
      while let Some(chunk) = field.chunk().await? {
         if (buffer.len() + chunk.len()) as u64 > max_file_size {
            return Err(AvatarError::TooLarge {
               max_bytes: max_file_size,
            }
            .into());
         }
         buffer.extend_from_slice(&chunk);
      }

      return Ok(Some(UploadedFile {
         file_name,
         content_type,
         bytes: buffer.freeze(),
      }));
   }
   Ok(None)
}
