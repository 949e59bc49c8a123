//! # Eventive BFF サーバー
//!
//! フロントエンド専用の API サーバー。
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────────┐
//! │   Browser    │────▶│     BFF      │────▶│       Supabase       │
//! │   (SPA)      │     │  port: 3000  │     │ Auth / REST / Storage│
//! └──────────────┘     └──────────────┘     └──────────────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `SUPABASE_URL` | **Yes** | Supabase プロジェクトの URL |
//! | `SUPABASE_SERVICE_ROLE_KEY` | **Yes** | サービスロールキー |
//! | `SUPABASE_ANON_KEY` | No | トークン検証時の `apikey` |
//! | `BFF_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `APP_ENV` | No | `development` / `production` / `test` |
//! | `CORS_ORIGINS` | No | 許可するオリジン（カンマ区切り） |
//! | `AVATAR_BUCKET` | No | アバター用バケット（デフォルト: `avatars`） |
//! | `MAX_FILE_SIZE` | No | アップロード上限バイト数 |
//! | `RATE_LIMIT_*` | No | レート制限（有効化・ウィンドウ秒数・上限件数） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p eventive-bff
//!
//! # 本番環境（環境変数を直接指定）
//! SUPABASE_URL=https://... SUPABASE_SERVICE_ROLE_KEY=... cargo run -p eventive-bff --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use eventive_bff::{app_builder::build_app, client::SupabaseClientImpl, config::BffConfig};
use eventive_domain::clock::SystemClock;
use eventive_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// BFF サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. ルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   let tracing_config = TracingConfig::from_env("bff");
   let service = tracing_config.service_name.clone();
   init_tracing(tracing_config);
   let _tracing_guard = tracing::info_span!("app", service = %service).entered();

   let config = BffConfig::from_env().context("設定の読み込みに失敗しました")?;
   tracing::info!(
      environment = config.app_env.as_str(),
      "BFF サーバーを起動します: {}:{}",
      config.host,
      config.port
   );

   let client = Arc::new(
      SupabaseClientImpl::new(&config.supabase)
         .context("Supabase クライアントの初期化に失敗しました")?,
   );
   let app = build_app(&config, client, Arc::new(SystemClock));

   let addr: SocketAddr = format!("{}:{}", config.host, config.port)
      .parse()
      .context("アドレスのパースに失敗しました")?;

   let listener = TcpListener::bind(addr).await?;
   tracing::info!("BFF サーバーが起動しました: {}", addr);

   // レート制限のキーに接続元アドレスを使うため ConnectInfo を付与する
   axum::serve(
      listener,
      app.into_make_service_with_connect_info::<SocketAddr>(),
   )
   .await?;

   Ok(())
}
