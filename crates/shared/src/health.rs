//! # ヘルスチェック共通型
//!
//! `/health` エンドポイントのレスポンス型。
//! ヘルスチェックは Liveness 用途のため、エンベロープで包まずにそのまま返す。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ヘルスチェックレスポンス
///
/// ## 使用例
///
/// ```
/// use chrono::Utc;
/// use eventive_shared::HealthResponse;
///
/// let response = HealthResponse::healthy(Utc::now(), 12, "development");
/// assert_eq!(response.status, "healthy");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
   /// 稼働状態（常に `"healthy"`）
   pub status:         String,
   /// 応答時刻
   pub timestamp:      DateTime<Utc>,
   /// アプリケーションバージョン
   pub version:        String,
   /// プロセス起動からの経過秒数
   pub uptime_seconds: u64,
   /// 実行環境名（`development` / `production` / `test`）
   pub environment:    String,
}

impl HealthResponse {
   /// 稼働中レスポンスを作成する
   pub fn healthy(
      timestamp: DateTime<Utc>,
      uptime_seconds: u64,
      environment: impl Into<String>,
   ) -> Self {
      Self {
         status: "healthy".to_string(),
         timestamp,
         version: env!("CARGO_PKG_VERSION").to_string(),
         uptime_seconds,
         environment: environment.into(),
      }
   }
}
