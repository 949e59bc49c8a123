//! # プロフィール
//!
//! リモートの `profiles` テーブルの 1 行をリクエスト単位で射影した型群。
//!
//! ## 命名規約
//!
//! リモートの行は snake_case（`display_name`）、クライアントへの出力は
//! camelCase（`displayName`）で表現される。そのため本モジュールの型は
//! デシリアライズとシリアライズで異なる命名規約を使う。
//!
//! ## 含まれる型
//!
//! | 型 | 用途 |
//! |---|------|
//! | [`Profile`] | 本人向けの完全なプロフィール |
//! | [`PublicProfile`] | 他ユーザーに公開するフィールドのみ |
//! | [`ProfilePatch`] | 部分更新リクエスト |
//! | [`Settings`] | 任意キーの設定マップ |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::DEFAULT_ROLE;

/// 任意の JSON 値を持つ設定マップ
///
/// 内容はスキーマを持たない。公開可否の判定に使う `publicProfile` のみ意味を持つ。
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// 公開プロフィールの可否を表す設定キー
pub const PUBLIC_PROFILE_KEY: &str = "publicProfile";

/// 設定マップが公開プロフィールを許可しているか
///
/// `publicProfile` が JSON の `true` の場合のみ公開とする。
/// 文字列 `"true"` や数値は公開扱いにしない。
pub fn is_public_profile(settings: &Settings) -> bool {
   matches!(
      settings.get(PUBLIC_PROFILE_KEY),
      Some(serde_json::Value::Bool(true))
   )
}

/// プロフィール（本人向け）
///
/// `id` は認証基盤のユーザー ID と一致する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct Profile {
   pub id:           String,
   #[serde(default)]
   pub username:     Option<String>,
   #[serde(default)]
   pub display_name: Option<String>,
   #[serde(default)]
   pub avatar_url:   Option<String>,
   #[serde(default)]
   pub bio:          Option<String>,
   #[serde(default = "default_role", deserialize_with = "role_or_default")]
   pub role:         String,
   #[serde(default, deserialize_with = "settings_or_empty")]
   pub settings:     Settings,
   pub created_at:   DateTime<Utc>,
   pub updated_at:   DateTime<Utc>,
}

impl Profile {
   /// 部分更新を適用し、`updated_at` を進める
   ///
   /// `patch` で `None` のフィールドは変更しない。
   pub fn apply_patch(&mut self, patch: &ProfilePatch, now: DateTime<Utc>) {
      if let Some(username) = &patch.username {
         self.username = Some(username.clone());
      }
      if let Some(display_name) = &patch.display_name {
         self.display_name = Some(display_name.clone());
      }
      if let Some(bio) = &patch.bio {
         self.bio = Some(bio.clone());
      }
      self.updated_at = now;
   }
}

/// 公開プロフィール
///
/// 他ユーザーに見せてよいフィールドのみを持つ。`settings` は公開可否の
/// 判定にのみ使い、レスポンスには含めない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct PublicProfile {
   pub id:           String,
   #[serde(default)]
   pub username:     Option<String>,
   #[serde(default)]
   pub display_name: Option<String>,
   #[serde(default)]
   pub avatar_url:   Option<String>,
   #[serde(default)]
   pub bio:          Option<String>,
   pub created_at:   DateTime<Utc>,
   #[serde(skip_serializing, default, deserialize_with = "settings_or_empty")]
   pub settings:     Settings,
}

impl PublicProfile {
   /// リモートから取得するカラム
   pub const COLUMNS: &'static str = "id,username,display_name,avatar_url,bio,created_at,settings";

   /// 本人が公開を許可しているか
   pub fn is_public(&self) -> bool {
      is_public_profile(&self.settings)
   }
}

/// プロフィール部分更新リクエスト
///
/// 本文は camelCase を受け付ける。`display_name` も互換のため受理する。
/// 未知のフィールドは無視する（`id` / `role` / `avatarUrl` などは更新できない）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
   #[serde(default)]
   pub username:     Option<String>,
   #[serde(default, alias = "display_name")]
   pub display_name: Option<String>,
   #[serde(default)]
   pub bio:          Option<String>,
}

impl ProfilePatch {
   /// 更新対象のフィールドが 1 つもないか
   pub fn is_empty(&self) -> bool {
      self.username.is_none() && self.display_name.is_none() && self.bio.is_none()
   }
}

fn default_role() -> String {
   DEFAULT_ROLE.to_string()
}

/// `null` のロールを既定値として扱う
fn role_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
   D: Deserializer<'de>,
{
   let role = Option::<String>::deserialize(deserializer)?;
   Ok(role.unwrap_or_else(default_role))
}

/// `null` の設定を空マップとして扱う
fn settings_or_empty<'de, D>(deserializer: D) -> Result<Settings, D::Error>
where
   D: Deserializer<'de>,
{
   let settings = Option::<Settings>::deserialize(deserializer)?;
   Ok(settings.unwrap_or_default())
}
