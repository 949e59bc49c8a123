//! # Observability 基盤
//!
//! BFF のトレーシング初期化と Request ID まわりの部品。
//!
//! | 環境変数 | 既定値 | 用途 |
//! |----------|--------|------|
//! | `LOG_FORMAT` | `pretty` | `json` / `pretty` |
//! | `RUST_LOG` | `info,eventive=debug` | `EnvFilter` のディレクティブ |

use std::str::FromStr;

/// Request ID を運ぶ HTTP ヘッダー名
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info,eventive=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
   /// 1 イベント 1 行の JSON（本番環境向け）
   Json,
   /// 人間向けの整形出力（開発環境向け）
   #[default]
   Pretty,
}

/// 未知の `LOG_FORMAT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
   type Err = UnknownLogFormat;

   /// 前後の空白を無視し、大文字小文字を区別しない
   fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s.trim().to_ascii_lowercase().as_str() {
         "json" => Ok(Self::Json),
         "pretty" => Ok(Self::Pretty),
         _ => Err(UnknownLogFormat(s.to_string())),
      }
   }
}

impl LogFormat {
   /// `LOG_FORMAT` を読み取る
   ///
   /// 不正な値は stderr に警告して [`Pretty`](LogFormat::Pretty) に倒す。
   /// トレーシング初期化前に呼ばれるため `tracing` は使えない。
   pub fn from_env() -> Self {
      let Ok(raw) = std::env::var("LOG_FORMAT") else {
         return Self::default();
      };
      raw.parse().unwrap_or_else(|UnknownLogFormat(value)| {
         eprintln!("WARNING: unknown LOG_FORMAT={value:?}, falling back to pretty");
         Self::default()
      })
   }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
   /// サービス名（ルートスパンの `service` フィールド）
   pub service_name:   String,
   pub log_format:     LogFormat,
   /// `RUST_LOG` 未設定時に使うフィルタ
   pub default_filter: String,
}

impl TracingConfig {
   pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
      Self {
         service_name: service_name.into(),
         log_format,
         default_filter: DEFAULT_LOG_FILTER.to_string(),
      }
   }

   pub fn from_env(service_name: impl Into<String>) -> Self {
      Self::new(service_name, LogFormat::from_env())
   }
}

/// グローバルサブスクライバを登録する
///
/// JSON 形式ではイベントのフィールドをトップレベルに展開し、現在のスパン
/// （`request_id` を含む）を併せて出力する。プロセスで 1 回だけ呼ぶこと。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) {
   use tracing_subscriber::{EnvFilter, Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

   let filter = EnvFilter::try_from_default_env()
      .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

   let output = match config.log_format {
      LogFormat::Json => tracing_subscriber::fmt::layer()
         .json()
         .flatten_event(true)
         .with_current_span(true)
         .with_span_list(false)
         .boxed(),
      LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
   };

   tracing_subscriber::registry().with(filter).with(output).init();
}

/// 受信リクエストに UUID v7 の Request ID を割り当てる
///
/// `SetRequestIdLayer` はクライアント提供の `X-Request-Id` を優先するため、
/// ヘッダーがないリクエストでのみ呼ばれる。
#[cfg(feature = "observability")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

#[cfg(feature = "observability")]
impl tower_http::request_id::MakeRequestId for MakeRequestUuidV7 {
   fn make_request_id<B>(
      &mut self,
      _request: &http::Request<B>,
   ) -> Option<tower_http::request_id::RequestId> {
      http::HeaderValue::try_from(uuid::Uuid::now_v7().to_string())
         .ok()
         .map(tower_http::request_id::RequestId::new)
   }
}

/// `TraceLayer` 用のリクエストスパン
///
/// `request_id` をフィールドに持つため、リクエスト内のログすべてに付く。
/// Request ID がまだ割り当てられていない場合は `-`。
#[cfg(feature = "observability")]
pub fn make_request_span<B>(request: &http::Request<B>) -> tracing::Span {
   let request_id = request
      .extensions()
      .get::<tower_http::request_id::RequestId>()
      .and_then(|id| id.header_value().to_str().ok())
      .unwrap_or("-");

   tracing::info_span!(
      "request",
      method = %request.method(),
      path = %request.uri().path(),
      request_id = %request_id,
   )
}
