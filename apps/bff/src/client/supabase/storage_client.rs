//! ストレージ関連の Supabase クライアント

use async_trait::async_trait;
use bytes::Bytes;
use eventive_domain::avatar::{AvatarContentType, AvatarObjectKey};
use reqwest::Method;

use super::{
   client_impl::SupabaseClientImpl,
   error::SupabaseError,
   response::handle_empty_response,
   types::RemoveObjectsRequest,
};

/// ストレージ関連の Supabase クライアントトレイト
#[async_trait]
pub trait SupabaseStorageClient: Send + Sync {
   /// オブジェクトをアップロードする（同じキーがあれば上書き）
   ///
   /// Supabase の `POST /storage/v1/object/{bucket}/{key}` を呼び出す。
   async fn upload_object(
      &self,
      bucket: &str,
      key: &AvatarObjectKey,
      content_type: AvatarContentType,
      body: Bytes,
   ) -> Result<(), SupabaseError>;

   /// オブジェクトを削除する
   ///
   /// Supabase の `DELETE /storage/v1/object/{bucket}` を呼び出す。
   async fn remove_object(&self, bucket: &str, key: &AvatarObjectKey)
   -> Result<(), SupabaseError>;

   /// オブジェクトの公開 URL を組み立てる（リモート呼び出しなし）
   fn public_url(&self, bucket: &str, key: &AvatarObjectKey) -> String;
}

#[async_trait]
impl SupabaseStorageClient for SupabaseClientImpl {
   #[tracing::instrument(skip(self, key, body), fields(key = %key, size = body.len()))]
   async fn upload_object(
      &self,
      bucket: &str,
      key: &AvatarObjectKey,
      content_type: AvatarContentType,
      body: Bytes,
   ) -> Result<(), SupabaseError> {
      let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, key);

      let response = self
         .service_request(Method::POST, &url)
         .header(reqwest::header::CONTENT_TYPE, content_type.as_mime())
         .header("x-upsert", "true")
         .body(body)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   #[tracing::instrument(skip(self, key), fields(key = %key))]
   async fn remove_object(
      &self,
      bucket: &str,
      key: &AvatarObjectKey,
   ) -> Result<(), SupabaseError> {
      let url = format!("{}/storage/v1/object/{}", self.base_url, bucket);
      let body = RemoveObjectsRequest {
         prefixes: vec![key.as_str()],
      };

      let response = self
         .service_request(Method::DELETE, &url)
         .json(&body)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   fn public_url(&self, bucket: &str, key: &AvatarObjectKey) -> String {
      format!(
         "{}/storage/v1/object/public/{}/{}",
         self.base_url, bucket, key
      )
   }
}
