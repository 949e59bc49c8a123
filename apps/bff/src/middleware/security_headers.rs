//! # セキュリティヘッダーミドルウェア
//!
//! 動的 API レスポンスがブラウザにキャッシュされないよう `Cache-Control: no-store`
//! を付与し、あわせてブラウザ向けの防御ヘッダーを設定する。
//! 既にハンドラが設定したヘッダーは上書きしない。

use axum::{
   extract::Request,
   http::{HeaderName, HeaderValue, header},
   middleware::Next,
   response::Response,
};

static SECURITY_HEADERS: [(HeaderName, &str); 5] = [
   (header::CACHE_CONTROL, "no-store"),
   (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
   (header::X_FRAME_OPTIONS, "DENY"),
   (header::X_XSS_PROTECTION, "1; mode=block"),
   (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
];

/// 全レスポンスにキャッシュ制御とセキュリティヘッダーを付与する
pub async fn security_headers(request: Request, next: Next) -> Response {
   let mut response = next.run(request).await;
   let headers = response.headers_mut();

   for (name, value) in &SECURITY_HEADERS {
      headers
         .entry(name.clone())
         .or_insert_with(|| HeaderValue::from_static(*value));
   }
   response
}
