//! # BFF アプリケーション構築
//!
//! State の初期化とルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。
//!
//! ## ルートグループ
//!
//! | グループ | 認証 | レート制限 |
//! |----------|------|------------|
//! | `/health` | なし | なし |
//! | `/docs`, `/api/auth/*`, `GET /api/users/{id}` | なし | 認証前に適用 |
//! | `/api/users/me`, `/api/settings`, `/api/uploads/avatar` | 必須 | 認証前は接続元単位（401 のみ計上）、認証後はユーザー単位 |

use std::{sync::Arc, time::Instant};

use axum::{
   Router,
   extract::DefaultBodyLimit,
   http::{HeaderName, HeaderValue, Method, header},
   middleware::{from_fn, from_fn_with_state},
   routing::{get, post},
};
use eventive_domain::clock::Clock;
use eventive_shared::observability::{MakeRequestUuidV7, REQUEST_ID_HEADER, make_request_span};
use tower_http::{
   compression::CompressionLayer,
   cors::{AllowOrigin, CorsLayer},
   request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
   trace::TraceLayer,
};

use crate::{
   client::SupabaseClient,
   config::BffConfig,
   error::{ErrorPolicy, route_not_found},
   handler::{
      HealthState,
      SettingsState,
      UploadState,
      UserState,
      api_docs,
      auth_callback,
      delete_avatar,
      get_me,
      get_public_profile,
      get_settings,
      health_check,
      logout,
      refresh_token,
      update_me,
      update_settings,
      upload_avatar,
   },
   middleware::{
      AuthState,
      RateLimiter,
      rate_limit,
      rate_limit_unauthenticated,
      request_id::store_request_id,
      require_auth,
      security_headers,
   },
};

/// multipart 本文の下限（ファイル以外のパートやヘッダー分の余裕）
const MIN_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// State の構築とルーター定義を行う
///
/// `client` は具象型で受け取り、各 State 注入時に必要なサブトレイトへ coerce する。
pub fn build_app<C>(config: &BffConfig, client: Arc<C>, clock: Arc<dyn Clock>) -> Router
where
   C: SupabaseClient + 'static,
{
   let error_policy = ErrorPolicy::for_env(config.app_env);

   // プロセス全体で 1 つのレートリミッタを共有する
   let limiter = Arc::new(RateLimiter::new(config.rate_limit));

   let health_state = Arc::new(HealthState {
      started_at: Instant::now(),
      app_env:    config.app_env,
      clock:      clock.clone(),
   });

   // 認証ミドルウェアはトークン検証とロール取得のみ
   let auth_state = AuthState {
      auth_client: client.clone(),
      profile_client: client.clone(),
      error_policy,
   };

   let user_state = Arc::new(UserState {
      profile_client: client.clone(),
      clock: clock.clone(),
      error_policy,
   });

   let settings_state = Arc::new(SettingsState {
      profile_client: client.clone(),
      clock: clock.clone(),
      error_policy,
   });

   let upload_state = Arc::new(UploadState {
      profile_client: client.clone(),
      storage_client: client,
      clock,
      error_policy,
      bucket: config.avatar_bucket.clone(),
      max_file_size: config.max_file_size,
   });

   let body_limit = usize::try_from(config.max_file_size.saturating_mul(2))
      .unwrap_or(usize::MAX)
      .max(MIN_BODY_LIMIT);

   // 公開ルート: レート制限のみ
   let public = Router::new()
      .route("/docs", get(api_docs))
      .route("/api/auth/callback", post(auth_callback))
      .route("/api/auth/refresh", post(refresh_token))
      .route("/api/auth/logout", post(logout))
      .merge(
         Router::new()
            .route("/api/users/{id}", get(get_public_profile))
            .with_state(user_state.clone()),
      )
      .layer(from_fn_with_state(limiter.clone(), rate_limit));

   // 保護ルート: 下に書いたものが外側のため、
   // 接続元のレート制限 → 認証 → ユーザー単位のレート制限の順に実行される
   let protected = Router::new()
      .route("/api/users/me", get(get_me).put(update_me))
      .with_state(user_state)
      .merge(
         Router::new()
            .route("/api/settings", get(get_settings).put(update_settings))
            .with_state(settings_state),
      )
      .merge(
         Router::new()
            .route(
               "/api/uploads/avatar",
               post(upload_avatar).delete(delete_avatar),
            )
            .layer(DefaultBodyLimit::max(body_limit))
            .with_state(upload_state),
      )
      .layer(from_fn_with_state(limiter.clone(), rate_limit))
      .layer(from_fn_with_state(auth_state, require_auth))
      .layer(from_fn_with_state(limiter, rate_limit_unauthenticated));

   Router::new()
      .route("/health", get(health_check))
      .with_state(health_state)
      .merge(public)
      .merge(protected)
      .fallback(route_not_found)
      .layer(from_fn(security_headers))
      .layer(CompressionLayer::new())
      .layer(cors_layer(&config.cors_origins))
      // Request ID レイヤー（レイヤー順序が重要: 下に書いたものが外側）
      // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
      // 2. TraceLayer: スパンに request_id を含める
      // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
      // 4. store_request_id: task-local に保存し、Supabase 呼び出しに伝播する
      .layer(from_fn(store_request_id))
      .layer(PropagateRequestIdLayer::x_request_id())
      .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
      .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// 設定されたオリジンのみを許可する CORS レイヤー
///
/// ヘッダー値として不正なオリジンは WARN ログを出して除外する。
fn cors_layer(origins: &[String]) -> CorsLayer {
   let origins: Vec<HeaderValue> = origins
      .iter()
      .filter_map(|origin| match HeaderValue::from_str(origin) {
         Ok(value) => Some(value),
         Err(_) => {
            tracing::warn!(origin = %origin, "不正な CORS オリジンを無視します");
            None
         }
      })
      .collect();

   let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
   CorsLayer::new()
      .allow_origin(AllowOrigin::list(origins))
      .allow_credentials(true)
      .allow_methods([
         Method::GET,
         Method::POST,
         Method::PUT,
         Method::DELETE,
         Method::OPTIONS,
      ])
      .allow_headers([
         header::AUTHORIZATION,
         header::CONTENT_TYPE,
         request_id.clone(),
      ])
      .expose_headers([request_id, header::RETRY_AFTER])
}
