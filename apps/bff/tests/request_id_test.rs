//! # Request ID レイヤーのテスト
//!
//! `build_app` が組み立てるルーターで、Request ID レイヤー
//! （SetRequestIdLayer + PropagateRequestIdLayer + make_request_span）が
//! 正しく動作することを検証する。
//!
//! - 成功・失敗どちらのレスポンスにも `X-Request-Id` ヘッダーが含まれる
//! - クライアント提供の `X-Request-Id` がそのまま返される
//! - 自動生成の `X-Request-Id` が UUID v7 形式である
//! - ハンドラ内の task-local に同じ値が保存される

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
   Router,
   body::{Body, Bytes},
   middleware::from_fn,
   routing::get,
};
use chrono::{TimeZone, Utc};
use eventive_bff::{
   app_builder::build_app,
   client::{
      AuthUser,
      ProfileUpdate,
      SupabaseAuthClient,
      SupabaseError,
      SupabaseProfileClient,
      SupabaseStorageClient,
   },
   config::BffConfig,
   middleware::request_id::{current_request_id, store_request_id},
};
use eventive_domain::{
   avatar::{AvatarContentType, AvatarObjectKey},
   clock::FixedClock,
   profile::{Profile, PublicProfile, Settings},
};
use eventive_shared::observability::{MakeRequestUuidV7, make_request_span};
use http::{Request, StatusCode};
use tower::ServiceExt;
use tower_http::{
   request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
   trace::TraceLayer,
};

/// 常に失敗する Supabase スタブ（Request ID の検証ではリモートを使わない）
struct OfflineSupabase;

#[async_trait]
impl SupabaseAuthClient for OfflineSupabase {
   async fn verify_token(&self, _token: &str) -> Result<AuthUser, SupabaseError> {
      Err(SupabaseError::InvalidToken)
   }
}

#[async_trait]
impl SupabaseProfileClient for OfflineSupabase {
   async fn get_profile(&self, _user_id: &str) -> Result<Profile, SupabaseError> {
      Err(SupabaseError::NotFound)
   }

   async fn get_public_profile(&self, _user_id: &str) -> Result<PublicProfile, SupabaseError> {
      Err(SupabaseError::NotFound)
   }

   async fn get_role(&self, _user_id: &str) -> Result<Option<String>, SupabaseError> {
      Ok(None)
   }

   async fn get_settings(&self, _user_id: &str) -> Result<Settings, SupabaseError> {
      Err(SupabaseError::NotFound)
   }

   async fn update_profile(
      &self,
      _user_id: &str,
      _update: &ProfileUpdate,
   ) -> Result<Profile, SupabaseError> {
      Err(SupabaseError::NotFound)
   }
}

#[async_trait]
impl SupabaseStorageClient for OfflineSupabase {
   async fn upload_object(
      &self,
      _bucket: &str,
      _key: &AvatarObjectKey,
      _content_type: AvatarContentType,
      _body: Bytes,
   ) -> Result<(), SupabaseError> {
      Err(SupabaseError::Network("offline".to_string()))
   }

   async fn remove_object(
      &self,
      _bucket: &str,
      _key: &AvatarObjectKey,
   ) -> Result<(), SupabaseError> {
      Err(SupabaseError::Network("offline".to_string()))
   }

   fn public_url(&self, bucket: &str, key: &AvatarObjectKey) -> String {
      format!("https://offline.invalid/{bucket}/{key}")
   }
}

/// 本番と同じ構成のルーター
fn test_app() -> Router {
   let config = BffConfig::from_lookup(|key| match key {
      "SUPABASE_URL" => Some("https://offline.invalid".to_string()),
      "SUPABASE_SERVICE_ROLE_KEY" => Some("service-key".to_string()),
      "APP_ENV" => Some("test".to_string()),
      _ => None,
   })
   .unwrap();
   let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
   build_app(&config, Arc::new(OfflineSupabase), Arc::new(clock))
}

fn request(uri: &str, request_id: Option<&str>) -> Request<Body> {
   let mut builder = Request::builder().uri(uri);
   if let Some(id) = request_id {
      builder = builder.header("x-request-id", id);
   }
   builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_レスポンスにx_request_idヘッダーが含まれる() {
   let response = test_app().oneshot(request("/health", None)).await.unwrap();

   assert_eq!(response.status(), StatusCode::OK);
   assert!(
      response.headers().contains_key("x-request-id"),
      "レスポンスに x-request-id ヘッダーが含まれること"
   );
}

#[tokio::test]
async fn test_エラーレスポンスにもx_request_idヘッダーが含まれる() {
   let response = test_app()
      .oneshot(request("/api/users/me", None))
      .await
      .unwrap();

   assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
   assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_クライアント提供のx_request_idがそのまま返される() {
   let custom_id = "client-provided-request-id-123";

   let response = test_app()
      .oneshot(request("/health", Some(custom_id)))
      .await
      .unwrap();

   assert_eq!(response.status(), StatusCode::OK);
   assert_eq!(
      response
         .headers()
         .get("x-request-id")
         .unwrap()
         .to_str()
         .unwrap(),
      custom_id,
      "クライアント提供の Request ID がそのまま返されること"
   );
}

#[tokio::test]
async fn test_自動生成のx_request_idがuuid_v7形式である() {
   let response = test_app().oneshot(request("/health", None)).await.unwrap();

   let request_id = response
      .headers()
      .get("x-request-id")
      .unwrap()
      .to_str()
      .unwrap();

   let uuid = uuid::Uuid::parse_str(request_id)
      .unwrap_or_else(|_| panic!("有効な UUID であること: {request_id}"));
   assert_eq!(
      uuid.get_version(),
      Some(uuid::Version::SortRand),
      "UUID v7（SortRand）であること"
   );
}

#[tokio::test]
async fn test_ハンドラ内でtask_localのrequest_idを参照できる() {
   // build_app と同じ Request ID レイヤー構成でハンドラだけ差し替える
   let app = Router::new()
      .route(
         "/echo",
         get(|| async { current_request_id().unwrap_or_default() }),
      )
      .layer(from_fn(store_request_id))
      .layer(PropagateRequestIdLayer::x_request_id())
      .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
      .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));

   let response = app.oneshot(request("/echo", Some("echo-id-1"))).await.unwrap();

   let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
   assert_eq!(&bytes[..], b"echo-id-1");
}
