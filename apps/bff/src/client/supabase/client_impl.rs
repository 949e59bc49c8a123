//! SupabaseClient スーパートレイトとクライアント実装の構造体

use reqwest::Method;

use super::{
   auth_client::SupabaseAuthClient,
   error::SupabaseError,
   profile_client::SupabaseProfileClient,
   storage_client::SupabaseStorageClient,
};
use crate::{config::SupabaseConfig, middleware::request_id::inject_request_id};

/// Supabase クライアントトレイト（スーパートレイト）
///
/// Auth / Profile / Storage の各サブトレイトを束ねるスーパートレイト。
/// テスト時にはサブトレイト単位でスタブを使用できる。
pub trait SupabaseClient:
   SupabaseAuthClient + SupabaseProfileClient + SupabaseStorageClient
{
}

/// ブランケット impl: 3 つのサブトレイトをすべて実装する型は
/// 自動的に `SupabaseClient` を実装する。
impl<T> SupabaseClient for T where
   T: SupabaseAuthClient + SupabaseProfileClient + SupabaseStorageClient
{
}

/// Supabase クライアント実装
///
/// プロセスで 1 つだけ作成し、`reqwest::Client` のコネクションプールを共有する。
#[derive(Clone)]
pub struct SupabaseClientImpl {
   pub(super) base_url:         String,
   pub(super) service_role_key: String,
   pub(super) anon_key:         String,
   pub(super) client:           reqwest::Client,
}

impl SupabaseClientImpl {
   /// 新しい SupabaseClient を作成する
   ///
   /// 全リクエストに `config.timeout` のタイムアウトを設定する。
   pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
      let client = reqwest::Client::builder()
         .timeout(config.timeout)
         .build()
         .map_err(|e| SupabaseError::Unexpected(format!("HTTP クライアントの初期化に失敗: {e}")))?;

      Ok(Self {
         base_url: config.url.trim_end_matches('/').to_string(),
         service_role_key: config.service_role_key.clone(),
         anon_key: config.anon_key.clone(),
         client,
      })
   }

   /// サービスロールキーで認証したリクエストを組み立てる
   pub(super) fn service_request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
      let builder = self
         .client
         .request(method, url)
         .header("apikey", &self.service_role_key)
         .bearer_auth(&self.service_role_key);
      inject_request_id(builder)
   }

   /// トークン検証時の `apikey`
   ///
   /// 匿名キーが未設定の場合はサービスロールキーを使う。
   pub(super) fn public_api_key(&self) -> &str {
      if self.anon_key.is_empty() {
         &self.service_role_key
      } else {
         &self.anon_key
      }
   }
}
