//! # BFF 設定
//!
//! 環境変数から BFF サーバーの設定を読み込む。
//!
//! 読み込みは [`BffConfig::from_lookup`] に集約しており、テストではプロセスの
//! 環境変数を書き換えずにクロージャで値を差し込む。

use std::{env, time::Duration};

use strum::{EnumString, IntoStaticStr};
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
   /// 必須の環境変数が未設定または空
   #[error("{0} が設定されていません")]
   Missing(&'static str),

   /// 値のパースに失敗
   #[error("{name} の値が不正です: {value:?}")]
   Invalid { name: &'static str, value: String },
}

/// 実行環境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AppEnv {
   Development,
   #[default]
   Production,
   Test,
}

impl AppEnv {
   /// エラーレスポンスに内部詳細を含めてよい環境か
   pub fn is_development(self) -> bool {
      self == Self::Development
   }

   pub fn as_str(self) -> &'static str {
      self.into()
   }
}

/// リモートバックエンド（Supabase）への接続設定
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
   /// プロジェクト URL（末尾の `/` は除去済み）
   pub url:              String,
   /// サービスロールキー
   pub service_role_key: String,
   /// 匿名キー（トークン検証時の `apikey`）
   pub anon_key:         String,
   /// リモート呼び出しのタイムアウト
   pub timeout:          Duration,
}

/// レート制限設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
   pub enabled:      bool,
   /// 固定ウィンドウの長さ
   pub window:       Duration,
   /// ウィンドウ内で許可するリクエスト数
   pub max_requests: u32,
}

impl Default for RateLimitConfig {
   fn default() -> Self {
      Self {
         enabled:      true,
         window:       Duration::from_secs(900),
         max_requests: 100,
      }
   }
}

/// BFF サーバーの設定
#[derive(Debug, Clone)]
pub struct BffConfig {
   /// バインドアドレス
   pub host:          String,
   /// ポート番号
   pub port:          u16,
   pub app_env:       AppEnv,
   pub supabase:      SupabaseConfig,
   /// CORS で許可するオリジン
   pub cors_origins:  Vec<String>,
   /// アバター画像を格納するバケット
   pub avatar_bucket: String,
   /// アップロード上限（バイト）
   pub max_file_size: u64,
   pub rate_limit:    RateLimitConfig,
}

impl BffConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(|key| env::var(key).ok())
   }

   /// 任意のルックアップ関数から設定を読み込む
   ///
   /// 空文字の値は未設定として扱う。
   pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
   where
      F: Fn(&str) -> Option<String>,
   {
      let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

      let url = get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
      let service_role_key = get("SUPABASE_SERVICE_ROLE_KEY")
         .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

      let app_env = match get("APP_ENV") {
         Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name: "APP_ENV",
            value,
         })?,
         None => AppEnv::default(),
      };

      let cors_origins = get("CORS_ORIGINS")
         .unwrap_or_else(|| "http://localhost:5173".to_string())
         .split(',')
         .map(str::trim)
         .filter(|origin| !origin.is_empty())
         .map(str::to_string)
         .collect();

      let defaults = RateLimitConfig::default();
      let rate_limit = RateLimitConfig {
         enabled:      parse_bool("RATE_LIMIT_ENABLED", get("RATE_LIMIT_ENABLED"), true)?,
         window:       Duration::from_secs(parse_number(
            "RATE_LIMIT_WINDOW_SECS",
            get("RATE_LIMIT_WINDOW_SECS"),
            defaults.window.as_secs(),
         )?),
         max_requests: parse_number(
            "RATE_LIMIT_MAX_REQUESTS",
            get("RATE_LIMIT_MAX_REQUESTS"),
            defaults.max_requests,
         )?,
      };

      Ok(Self {
         host: get("BFF_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
         port: parse_number("PORT", get("PORT"), 3000)?,
         app_env,
         supabase: SupabaseConfig {
            url: url.trim().trim_end_matches('/').to_string(),
            service_role_key,
            anon_key: get("SUPABASE_ANON_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(parse_number(
               "SUPABASE_TIMEOUT_SECS",
               get("SUPABASE_TIMEOUT_SECS"),
               10,
            )?),
         },
         cors_origins,
         avatar_bucket: get("AVATAR_BUCKET").unwrap_or_else(|| "avatars".to_string()),
         max_file_size: parse_number("MAX_FILE_SIZE", get("MAX_FILE_SIZE"), 5 * 1024 * 1024)?,
         rate_limit,
      })
   }
}

fn parse_number<T: std::str::FromStr>(
   name: &'static str,
   value: Option<String>,
   default: T,
) -> Result<T, ConfigError> {
   match value {
      Some(value) => value
         .trim()
         .parse()
         .map_err(|_| ConfigError::Invalid { name, value }),
      None => Ok(default),
   }
}

fn parse_bool(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
   let Some(value) = value else {
      return Ok(default);
   };
   match value.trim().to_ascii_lowercase().as_str() {
      "true" | "1" => Ok(true),
      "false" | "0" => Ok(false),
      _ => Err(ConfigError::Invalid { name, value }),
   }
}

#[cfg(test)]
mod tests {
   use std::collections::HashMap;

   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
      let map: HashMap<String, String> = pairs
         .iter()
         .map(|(k, v)| (k.to_string(), v.to_string()))
         .collect();
      move |key| map.get(key).cloned()
   }

   const REQUIRED: [(&str, &str); 2] = [
      ("SUPABASE_URL", "https://project.supabase.co/"),
      ("SUPABASE_SERVICE_ROLE_KEY", "service-key"),
   ];

   #[test]
   fn test_必須項目のみで既定値が適用される() {
      let config = BffConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

      assert_eq!(config.host, "0.0.0.0");
      assert_eq!(config.port, 3000);
      assert_eq!(config.app_env, AppEnv::Production);
      assert_eq!(config.supabase.url, "https://project.supabase.co");
      assert_eq!(config.supabase.anon_key, "");
      assert_eq!(config.supabase.timeout, Duration::from_secs(10));
      assert_eq!(config.cors_origins, vec!["http://localhost:5173".to_string()]);
      assert_eq!(config.avatar_bucket, "avatars");
      assert_eq!(config.max_file_size, 5_242_880);
      assert_eq!(config.rate_limit, RateLimitConfig::default());
   }

   #[rstest]
   #[case("SUPABASE_URL")]
   #[case("SUPABASE_SERVICE_ROLE_KEY")]
   fn test_必須項目が欠けているとmissingエラー(#[case] missing: &str) {
      let pairs: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();

      let result = BffConfig::from_lookup(lookup_from(&pairs));

      assert!(matches!(result, Err(ConfigError::Missing(name)) if name == missing));
   }

   #[test]
   fn test_空文字の必須項目は未設定として扱う() {
      let result = BffConfig::from_lookup(lookup_from(&[
         ("SUPABASE_URL", "  "),
         ("SUPABASE_SERVICE_ROLE_KEY", "k"),
      ]));

      assert_eq!(result.unwrap_err(), ConfigError::Missing("SUPABASE_URL"));
   }

   #[test]
   fn test_cors_originsはカンマ区切りで空要素を除く() {
      let mut pairs = REQUIRED.to_vec();
      pairs.push(("CORS_ORIGINS", "https://a.example, https://b.example,,"));

      let config = BffConfig::from_lookup(lookup_from(&pairs)).unwrap();

      assert_eq!(
         config.cors_origins,
         vec!["https://a.example".to_string(), "https://b.example".to_string()]
      );
   }

   #[rstest]
   #[case("PORT", "abc")]
   #[case("MAX_FILE_SIZE", "-1")]
   #[case("RATE_LIMIT_WINDOW_SECS", "15m")]
   #[case("RATE_LIMIT_MAX_REQUESTS", "many")]
   #[case("RATE_LIMIT_ENABLED", "yes")]
   #[case("APP_ENV", "staging")]
   fn test_不正な値はinvalidエラー(#[case] name: &str, #[case] value: &str) {
      let mut pairs = REQUIRED.to_vec();
      pairs.push((name, value));

      let result = BffConfig::from_lookup(lookup_from(&pairs));

      assert!(matches!(result, Err(ConfigError::Invalid { name: n, .. }) if n == name));
   }

   #[rstest]
   #[case("development", AppEnv::Development)]
   #[case("Production", AppEnv::Production)]
   #[case("TEST", AppEnv::Test)]
   fn test_app_envは大文字小文字を区別しない(#[case] value: &str, #[case] expected: AppEnv) {
      let mut pairs = REQUIRED.to_vec();
      pairs.push(("APP_ENV", value));

      let config = BffConfig::from_lookup(lookup_from(&pairs)).unwrap();

      assert_eq!(config.app_env, expected);
      assert_eq!(config.app_env.as_str(), value.to_ascii_lowercase());
   }

   #[test]
   fn test_レート制限を無効化できる() {
      let mut pairs = REQUIRED.to_vec();
      pairs.push(("RATE_LIMIT_ENABLED", "false"));
      pairs.push(("RATE_LIMIT_MAX_REQUESTS", "5"));

      let config = BffConfig::from_lookup(lookup_from(&pairs)).unwrap();

      assert!(!config.rate_limit.enabled);
      assert_eq!(config.rate_limit.max_requests, 5);
   }
}
