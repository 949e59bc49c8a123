//! # レート制限ミドルウェア
//!
//! キーごとの固定ウィンドウカウンタで、ウィンドウ内のリクエスト数を制限する。
//! 上限を超えたリクエストは 429 と `Retry-After`（秒）を返す。
//!
//! ## キー
//!
//! 1. 認証済みなら `user:{identity.id}`
//! 2. 接続元アドレスが分かれば `ip:{addr}`
//! 3. `Host` ヘッダーがあれば `host:{host}`
//! 4. いずれもなければ `anonymous`
//!
//! 公開ルートでは認証より前に [`rate_limit`] を適用する。保護ルートでは
//! [`rate_limit_unauthenticated`] が認証より前に認証失敗の回数を接続元単位で確認し、
//! 認証の直後に [`rate_limit`] がユーザー単位で数える。
//! 状態はプロセス内のみで、複数インスタンス間では共有しない。

use std::{
   collections::HashMap,
   net::SocketAddr,
   sync::{Arc, Mutex, PoisonError},
   time::{Duration, Instant},
};

use axum::{
   extract::{ConnectInfo, Request, State},
   http::{StatusCode, header},
   middleware::Next,
   response::{IntoResponse, Response},
};
use eventive_domain::identity::Identity;

use crate::{config::RateLimitConfig, error::ApiError};

/// 期限切れウィンドウの掃除を始めるエントリ数
const PRUNE_THRESHOLD: usize = 1024;

/// 1 キー分のウィンドウ
#[derive(Debug, Clone, Copy)]
struct Window {
   started: Instant,
   count:   u32,
}

/// 判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
   pub allowed:          bool,
   /// 次のウィンドウが始まるまでの秒数（許可時は 0）
   pub retry_after_secs: u64,
}

impl RateLimitDecision {
   fn allow() -> Self {
      Self {
         allowed:          true,
         retry_after_secs: 0,
      }
   }
}

/// 固定ウィンドウのレートリミッタ
#[derive(Debug)]
pub struct RateLimiter {
   config:  RateLimitConfig,
   windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
   pub fn new(config: RateLimitConfig) -> Self {
      Self {
         config,
         windows: Mutex::new(HashMap::new()),
      }
   }

   pub fn enabled(&self) -> bool {
      self.config.enabled
   }

   /// キーのリクエストを 1 件数え、許可するか判定する
   pub fn check(&self, key: &str) -> RateLimitDecision {
      self.check_at(key, Instant::now())
   }

   /// 数えずに、次のリクエストが許可されるか判定する
   pub fn peek(&self, key: &str) -> RateLimitDecision {
      self.peek_at(key, Instant::now())
   }

   fn peek_at(&self, key: &str, now: Instant) -> RateLimitDecision {
      if !self.config.enabled {
         return RateLimitDecision::allow();
      }

      let window_len = self.config.window;
      let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
      match windows.get(key) {
         Some(window)
            if now.duration_since(window.started) < window_len
               && window.count >= self.config.max_requests =>
         {
            self.reject(window, now)
         }
         _ => RateLimitDecision::allow(),
      }
   }

   fn reject(&self, window: &Window, now: Instant) -> RateLimitDecision {
      let remaining = self
         .config
         .window
         .saturating_sub(now.duration_since(window.started));
      RateLimitDecision {
         allowed:          false,
         retry_after_secs: ceil_secs(remaining).max(1),
      }
   }

   fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
      if !self.config.enabled {
         return RateLimitDecision::allow();
      }

      let window_len = self.config.window;
      let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

      if windows.len() >= PRUNE_THRESHOLD {
         windows.retain(|_, w| now.duration_since(w.started) < window_len);
      }

      let window = windows.entry(key.to_string()).or_insert(Window {
         started: now,
         count:   0,
      });
      if now.duration_since(window.started) >= window_len {
         *window = Window {
            started: now,
            count:   0,
         };
      }

      if window.count >= self.config.max_requests {
         return self.reject(window, now);
      }

      window.count += 1;
      RateLimitDecision::allow()
   }

   #[cfg(test)]
   fn tracked_keys(&self) -> usize {
      self.windows
         .lock()
         .unwrap_or_else(PoisonError::into_inner)
         .len()
   }
}

fn ceil_secs(duration: Duration) -> u64 {
   let secs = duration.as_secs();
   if duration.subsec_nanos() > 0 {
      secs + 1
   } else {
      secs
   }
}

/// レート制限ミドルウェア
pub async fn rate_limit(
   State(limiter): State<Arc<RateLimiter>>,
   request: Request,
   next: Next,
) -> Response {
   if !limiter.enabled() {
      return next.run(request).await;
   }

   let key = rate_limit_key(&request);
   let decision = limiter.check(&key);
   if !decision.allowed {
      return too_many_requests(&key, decision);
   }

   next.run(request).await
}

/// 認証前のレート制限ミドルウェア（保護ルート用）
///
/// 認証に失敗した（401 の）リクエストだけを `unauthenticated:{接続元キー}` で数え、
/// 上限に達した接続元にはトークン検証のリモート呼び出しをせずに 429 を返す。
/// 公開ルートの接続元カウントとは別枠。
/// 認証に成功したリクエストは内側の [`rate_limit`] がユーザー単位で数える。
pub async fn rate_limit_unauthenticated(
   State(limiter): State<Arc<RateLimiter>>,
   request: Request,
   next: Next,
) -> Response {
   if !limiter.enabled() {
      return next.run(request).await;
   }

   let key = format!("unauthenticated:{}", connection_key(&request));
   let decision = limiter.peek(&key);
   if !decision.allowed {
      return too_many_requests(&key, decision);
   }

   let response = next.run(request).await;
   if response.status() == StatusCode::UNAUTHORIZED {
      limiter.check(&key);
   }
   response
}

fn too_many_requests(key: &str, decision: RateLimitDecision) -> Response {
   tracing::warn!(
      rate_limit.key = %key,
      retry_after_secs = decision.retry_after_secs,
      "レート制限を超過しました"
   );
   ApiError::TooManyRequests {
      retry_after_secs: decision.retry_after_secs,
   }
   .into_response()
}

/// リクエストからレート制限のキーを決める
fn rate_limit_key(request: &Request) -> String {
   match request.extensions().get::<Identity>() {
      Some(identity) => format!("user:{}", identity.id),
      None => connection_key(request),
   }
}

/// 認証情報を使わない接続元のキー
fn connection_key(request: &Request) -> String {
   if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
      return format!("ip:{}", addr.ip());
   }
   if let Some(host) = request
      .headers()
      .get(header::HOST)
      .and_then(|v| v.to_str().ok())
   {
      return format!("host:{host}");
   }
   "anonymous".to_string()
}
