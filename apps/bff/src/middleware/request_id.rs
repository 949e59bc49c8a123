//! # Request ID 伝播
//!
//! 受信リクエストの `X-Request-Id` を Supabase への送信リクエストに引き継ぐ。
//!
//! `SetRequestIdLayer` が割り当てた ID を [`store_request_id`] が task-local に置き、
//! クライアント実装は [`inject_request_id`] でそれを読み出してヘッダーに載せる。
//! クライアントのトレイトメソッドに ID を引数として通さずに済む。

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use eventive_shared::observability::REQUEST_ID_HEADER;
use tower_http::request_id::RequestId;

tokio::task_local! {
   static REQUEST_ID: String;
}

/// 処理中のリクエストの Request ID
///
/// [`store_request_id`] の外側（起動処理やテスト）では `None`。
pub fn current_request_id() -> Option<String> {
   REQUEST_ID.try_with(Clone::clone).ok()
}

/// Request ID を task-local に保存するミドルウェア
///
/// ID が割り当てられていない、または ASCII でない場合は何も保存しない。
pub async fn store_request_id(request: Request<Body>, next: Next) -> Response {
   let request_id = request
      .extensions()
      .get::<RequestId>()
      .and_then(|id| id.header_value().to_str().ok())
      .map(str::to_string);

   match request_id {
      Some(id) => REQUEST_ID.scope(id, next.run(request)).await,
      None => next.run(request).await,
   }
}

/// 送信リクエストに `X-Request-Id` を付与する
pub fn inject_request_id(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
   match current_request_id() {
      Some(id) => builder.header(REQUEST_ID_HEADER, id),
      None => builder,
   }
}
