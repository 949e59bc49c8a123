//! # ヘルスチェックハンドラ
//!
//! - `/health`: Liveness Check（認証ヘッダーの有無に関係なく常に 200）
//! - `/docs`: エンドポイント一覧
//!
//! どちらもエンベロープで包まずにそのまま返す。

use std::{sync::Arc, time::Instant};

use axum::{Json, extract::State};
use eventive_domain::clock::Clock;
use eventive_shared::HealthResponse;
use serde_json::json;

use crate::config::AppEnv;

/// ヘルスチェック用の State
pub struct HealthState {
   /// プロセス起動時刻
   pub started_at: Instant,
   pub app_env:    AppEnv,
   pub clock:      Arc<dyn Clock>,
}

/// BFF のヘルスチェックエンドポイント
pub async fn health_check(State(state): State<Arc<HealthState>>) -> Json<HealthResponse> {
   Json(HealthResponse::healthy(
      state.clock.now(),
      state.started_at.elapsed().as_secs(),
      state.app_env.as_str(),
   ))
}

/// API 一覧
pub async fn api_docs() -> Json<serde_json::Value> {
   Json(json!({
      "message": "API Documentation",
      "version": env!("CARGO_PKG_VERSION"),
      "endpoints": {
         "health": "GET /health",
         "auth": "/api/auth/*",
         "users": "/api/users/*",
         "settings": "/api/settings",
         "uploads": "/api/uploads/*",
      },
   }))
}
