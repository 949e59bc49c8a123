//! プロフィール関連の Supabase クライアント
//!
//! PostgREST は `id=eq.{id}` の検索結果を常に配列で返すため、
//! 先頭行を取り出し、空なら `NotFound` とする。

use async_trait::async_trait;
use eventive_domain::profile::{Profile, PublicProfile, Settings};
use reqwest::Method;

use super::{
   client_impl::SupabaseClientImpl,
   error::SupabaseError,
   response::{first_row, handle_response},
   types::{ProfileUpdate, RoleRow, SettingsRow},
};

/// プロフィール関連の Supabase クライアントトレイト
#[async_trait]
pub trait SupabaseProfileClient: Send + Sync {
   /// プロフィールを全カラム取得する
   async fn get_profile(&self, user_id: &str) -> Result<Profile, SupabaseError>;

   /// 公開用のカラムと `settings` を取得する
   async fn get_public_profile(&self, user_id: &str) -> Result<PublicProfile, SupabaseError>;

   /// ロールを取得する
   ///
   /// 行が存在しない、またはロールが `null` の場合は `Ok(None)`。
   async fn get_role(&self, user_id: &str) -> Result<Option<String>, SupabaseError>;

   /// 設定マップを取得する（`null` は空マップ）
   async fn get_settings(&self, user_id: &str) -> Result<Settings, SupabaseError>;

   /// プロフィールを更新し、更新後の行を返す
   ///
   /// `Prefer: return=representation` で更新後の行を受け取る。
   /// 対象行がない場合は `NotFound`。
   async fn update_profile(
      &self,
      user_id: &str,
      update: &ProfileUpdate,
   ) -> Result<Profile, SupabaseError>;
}

const PROFILES_TABLE: &str = "profiles";

impl SupabaseClientImpl {
   fn profiles_url(&self, user_id: &str, columns: &str) -> String {
      format!(
         "{}/rest/v1/{}?id=eq.{}&select={}",
         self.base_url,
         PROFILES_TABLE,
         urlencoding::encode(user_id),
         columns
      )
   }
}

#[async_trait]
impl SupabaseProfileClient for SupabaseClientImpl {
   #[tracing::instrument(skip(self))]
   async fn get_profile(&self, user_id: &str) -> Result<Profile, SupabaseError> {
      let url = self.profiles_url(user_id, "*");

      let response = self.service_request(Method::GET, &url).send().await?;
      first_row(handle_response(response).await?)
   }

   #[tracing::instrument(skip(self))]
   async fn get_public_profile(&self, user_id: &str) -> Result<PublicProfile, SupabaseError> {
      let url = self.profiles_url(user_id, PublicProfile::COLUMNS);

      let response = self.service_request(Method::GET, &url).send().await?;
      first_row(handle_response(response).await?)
   }

   #[tracing::instrument(skip(self))]
   async fn get_role(&self, user_id: &str) -> Result<Option<String>, SupabaseError> {
      let url = self.profiles_url(user_id, "role");

      let response = self.service_request(Method::GET, &url).send().await?;
      let rows: Vec<RoleRow> = handle_response(response).await?;
      Ok(rows.into_iter().next().and_then(|row| row.role))
   }

   #[tracing::instrument(skip(self))]
   async fn get_settings(&self, user_id: &str) -> Result<Settings, SupabaseError> {
      let url = self.profiles_url(user_id, "settings");

      let response = self.service_request(Method::GET, &url).send().await?;
      let row: SettingsRow = first_row(handle_response(response).await?)?;
      Ok(row.settings.unwrap_or_default())
   }

   #[tracing::instrument(skip(self, update))]
   async fn update_profile(
      &self,
      user_id: &str,
      update: &ProfileUpdate,
   ) -> Result<Profile, SupabaseError> {
      let url = self.profiles_url(user_id, "*");

      let response = self
         .service_request(Method::PATCH, &url)
         .header("Prefer", "return=representation")
         .json(update)
         .send()
         .await?;
      first_row(handle_response(response).await?)
   }
}
