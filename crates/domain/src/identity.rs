//! # Identity（認証済みユーザー）
//!
//! トークン検証とロール参照から組み立てる、リクエスト 1 回分のユーザー情報。
//! 永続化はしない。

use serde::{Deserialize, Serialize};

/// ロール参照に失敗した、または未設定の場合に使うロール
pub const DEFAULT_ROLE: &str = "user";

/// 認証済みユーザー
///
/// `id` はリモート認証基盤のサブジェクト ID と常に一致する。
///
/// ```
/// use eventive_domain::identity::Identity;
///
/// let identity = Identity::new("0b7c...", "a@example.com", None);
/// assert_eq!(identity.role, "user");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
   pub id:    String,
   pub email: String,
   pub role:  String,
}

impl Identity {
   /// Identity を作成する
   ///
   /// `role` が `None` または空文字の場合は [`DEFAULT_ROLE`] になる。
   pub fn new(id: impl Into<String>, email: impl Into<String>, role: Option<String>) -> Self {
      let role = role
         .filter(|r| !r.trim().is_empty())
         .unwrap_or_else(|| DEFAULT_ROLE.to_string());

      Self {
         id: id.into(),
         email: email.into(),
         role,
      }
   }
}

#[cfg(test)]
mod tests {
   use rstest::rstest;

   use super::*;

   #[rstest]
   #[case(None, "user")]
   #[case(Some(""), "user")]
   #[case(Some("  "), "user")]
   #[case(Some("admin"), "admin")]
   fn test_roleの既定値(#[case] role: Option<&str>, #[case] expected: &str) {
      let identity = Identity::new("u-1", "u@example.com", role.map(str::to_string));

      assert_eq!(identity.role, expected);
   }
}
