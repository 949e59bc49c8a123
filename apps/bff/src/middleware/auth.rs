//! # 認証ミドルウェア
//!
//! `Authorization: Bearer <token>` をリモートで検証し、[`Identity`] を
//! リクエストの extensions に格納する。
//!
//! ## 判定
//!
//! | 状況 | 結果 |
//! |------|------|
//! | ヘッダーなし / `Bearer ` 以外 / 空トークン | 401（リモート呼び出しなし） |
//! | リモートがトークンを拒否 | 401 |
//! | 接続失敗・タイムアウト・リモート 5xx | 500 |
//! | ロール取得の失敗 | ロール `"user"` で続行（WARN ログ） |
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! Router::new()
//!     .route("/api/users/me", get(get_me))
//!     .layer(from_fn_with_state(auth_state, require_auth))
//! ```
//!
//! ハンドラは [`CurrentUser`] エクストラクタで `Identity` を受け取る。

use std::sync::Arc;

use axum::{
   body::Body,
   extract::{FromRequestParts, State},
   http::{HeaderMap, Request, header, request::Parts},
   middleware::Next,
   response::{IntoResponse, Response},
};
use eventive_domain::identity::Identity;

use crate::{
   client::{SupabaseAuthClient, SupabaseError, SupabaseProfileClient},
   error::{ApiError, ErrorPolicy, log_and_convert_supabase_error},
};

const BEARER_PREFIX: &str = "Bearer ";

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthState {
   pub auth_client:    Arc<dyn SupabaseAuthClient>,
   pub profile_client: Arc<dyn SupabaseProfileClient>,
   pub error_policy:   ErrorPolicy,
}

/// 認証ミドルウェア
///
/// トークン検証に成功した場合のみ後続のハンドラを呼び出す。
pub async fn require_auth(
   State(state): State<AuthState>,
   mut request: Request<Body>,
   next: Next,
) -> Response {
   let Some(token) = bearer_token(request.headers()) else {
      return ApiError::missing_token().into_response();
   };

   let user = match state.auth_client.verify_token(token).await {
      Ok(user) => user,
      Err(SupabaseError::InvalidToken) => return ApiError::invalid_token().into_response(),
      Err(e) => {
         return log_and_convert_supabase_error(
            "トークン検証",
            e,
            state.error_policy,
            "User not found",
         )
         .into_response();
      }
   };

   let role = match state.profile_client.get_role(&user.id).await {
      Ok(role) => role,
      Err(e) => {
         tracing::warn!(
            error.category = "external_service",
            error.kind = "role_lookup",
            user_id = %user.id,
            "ロール取得に失敗したため既定ロールで続行します: {}",
            e
         );
         None
      }
   };

   let identity = Identity::new(user.id, user.email, role);
   tracing::debug!(user_id = %identity.id, role = %identity.role, "認証に成功しました");

   request.extensions_mut().insert(identity);
   next.run(request).await
}

/// `Authorization` ヘッダーから Bearer トークンを取り出す
///
/// プレフィックスは大文字小文字を区別する。空のトークンは `None`。
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
   headers
      .get(header::AUTHORIZATION)?
      .to_str()
      .ok()?
      .strip_prefix(BEARER_PREFIX)
      .map(str::trim)
      .filter(|token| !token.is_empty())
}

/// 認証済みユーザーを取り出すエクストラクタ
///
/// [`require_auth`] の内側でのみ使う。extensions に `Identity` がない場合は 401。
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
   S: Send + Sync,
{
   type Rejection = ApiError;

   async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
      parts
         .extensions
         .get::<Identity>()
         .cloned()
         .map(CurrentUser)
         .ok_or_else(ApiError::missing_token)
   }
}
