//! Supabase との通信で使う型

use chrono::{DateTime, Utc};
use eventive_domain::profile::{Profile, Settings};
use serde::{Deserialize, Serialize};

/// トークン検証で得られたユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
   pub id:    String,
   pub email: String,
}

/// `GET /auth/v1/user` のレスポンス
///
/// 電話番号認証などでは `email` が返らないことがある。
#[derive(Debug, Deserialize)]
pub(super) struct AuthUserBody {
   #[serde(default)]
   pub id:    Option<String>,
   #[serde(default)]
   pub email: Option<String>,
}

/// `select=role` の行
#[derive(Debug, Deserialize)]
pub(super) struct RoleRow {
   #[serde(default)]
   pub role: Option<String>,
}

/// `select=settings` の行
#[derive(Debug, Deserialize)]
pub(super) struct SettingsRow {
   #[serde(default)]
   pub settings: Option<Settings>,
}

/// ストレージ削除リクエスト
#[derive(Debug, Serialize)]
pub(super) struct RemoveObjectsRequest<'a> {
   pub prefixes: Vec<&'a str>,
}

/// プロフィール行の更新内容（PATCH ボディ）
///
/// `None` のフィールドは送信しない。`avatar_url` を `Some(None)` にすると
/// リモートの値を `null` にクリアする。`updated_at` は常に送る。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
   #[serde(skip_serializing_if = "Option::is_none")]
   pub username:     Option<String>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub display_name: Option<String>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub bio:          Option<String>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub avatar_url:   Option<Option<String>>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub settings:     Option<Settings>,
   pub updated_at:   DateTime<Utc>,
}

impl ProfileUpdate {
   /// `updated_at` のみを更新する内容を作成する
   pub fn touch(updated_at: DateTime<Utc>) -> Self {
      Self {
         username: None,
         display_name: None,
         bio: None,
         avatar_url: None,
         settings: None,
         updated_at,
      }
   }

   /// マージ済みプロフィールの編集可能フィールドを書き戻す
   pub fn editable_fields(profile: &Profile) -> Self {
      Self {
         username: profile.username.clone(),
         display_name: profile.display_name.clone(),
         bio: profile.bio.clone(),
         ..Self::touch(profile.updated_at)
      }
   }

   /// 設定マップを丸ごと置き換える
   pub fn with_settings(mut self, settings: Settings) -> Self {
      self.settings = Some(settings);
      self
   }

   /// アバター URL を設定する（`None` でクリア）
   pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
      self.avatar_url = Some(avatar_url);
      self
   }
}
