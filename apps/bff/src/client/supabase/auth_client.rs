//! 認証関連の Supabase クライアント

use async_trait::async_trait;

use super::{
   client_impl::SupabaseClientImpl,
   error::SupabaseError,
   types::{AuthUser, AuthUserBody},
};
use crate::middleware::request_id::inject_request_id;

/// 認証関連の Supabase クライアントトレイト
#[async_trait]
pub trait SupabaseAuthClient: Send + Sync {
   /// アクセストークンを検証し、サブジェクトを返す
   ///
   /// Supabase の `GET /auth/v1/user` を呼び出す。
   ///
   /// # 戻り値
   ///
   /// - リモートが 401 / 403 を返した、またはサブジェクトがない: `InvalidToken`
   /// - 接続失敗・タイムアウト: `Network`
   /// - その他のステータス: `Unexpected`
   async fn verify_token(&self, token: &str) -> Result<AuthUser, SupabaseError>;
}

#[async_trait]
impl SupabaseAuthClient for SupabaseClientImpl {
   #[tracing::instrument(skip_all)]
   async fn verify_token(&self, token: &str) -> Result<AuthUser, SupabaseError> {
      let url = format!("{}/auth/v1/user", self.base_url);

      let builder = self
         .client
         .get(&url)
         .header("apikey", self.public_api_key())
         .bearer_auth(token);
      let response = inject_request_id(builder).send().await?;

      match response.status() {
         status if status.is_success() => {
            let body = response.json::<AuthUserBody>().await?;
            to_auth_user(body)
         }
         reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            Err(SupabaseError::InvalidToken)
         }
         status => {
            let body = response.text().await.unwrap_or_default();
            Err(SupabaseError::Unexpected(format!(
               "予期しないステータス {}: {}",
               status, body
            )))
         }
      }
   }
}

/// 検証レスポンスからサブジェクトを取り出す
fn to_auth_user(body: AuthUserBody) -> Result<AuthUser, SupabaseError> {
   let id = body
      .id
      .filter(|id| !id.is_empty())
      .ok_or(SupabaseError::InvalidToken)?;

   Ok(AuthUser {
      id,
      email: body.email.unwrap_or_default(),
   })
}
