//! # アバター
//!
//! アバター画像アップロードのローカル検証と、ストレージ上のオブジェクトキー生成。
//!
//! 検証はリモート呼び出しより前に行い、失敗した場合はストレージにも
//! プロフィールにも一切触れない。
//!
//! オブジェクトキーは `{userId}/{uuid}{.ext}` 形式で、ユーザーごとに
//! プレフィックスが分かれる。

use derive_more::Display;
use strum::IntoStaticStr;
use uuid::Uuid;

use crate::AvatarError;

/// 受け付ける画像の MIME タイプ
///
/// パースは大文字小文字を区別しない。`image/jpg` は `image/jpeg` として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum AvatarContentType {
   #[strum(to_string = "image/jpeg", serialize = "image/jpg")]
   Jpeg,
   #[strum(to_string = "image/png")]
   Png,
   #[strum(to_string = "image/gif")]
   Gif,
   #[strum(to_string = "image/webp")]
   Webp,
}

impl AvatarContentType {
   /// MIME タイプ文字列をパースする
   pub fn parse(mime: &str) -> Result<Self, AvatarError> {
      mime.trim()
         .parse()
         .map_err(|_| AvatarError::UnsupportedType(mime.to_string()))
   }

   /// ストレージへ送る正規化済みの MIME タイプ
   pub fn as_mime(&self) -> &'static str {
      self.into()
   }

   /// ファイル名に拡張子がない場合に使う拡張子
   pub fn default_extension(&self) -> &'static str {
      match self {
         Self::Jpeg => "jpg",
         Self::Png => "png",
         Self::Gif => "gif",
         Self::Webp => "webp",
      }
   }
}

/// アップロードされたファイルを検証する
///
/// 判定順序: 空ファイル → サイズ上限 → MIME タイプ。
///
/// # Errors
///
/// - ファイルが空の場合: [`AvatarError::Missing`]
/// - `size` が `max_bytes` を超える場合: [`AvatarError::TooLarge`]
/// - 許可されていない MIME タイプの場合: [`AvatarError::UnsupportedType`]
pub fn validate_upload(
   size: u64,
   max_bytes: u64,
   content_type: Option<&str>,
) -> Result<AvatarContentType, AvatarError> {
   if size == 0 {
      return Err(AvatarError::Missing);
   }
   if size > max_bytes {
      return Err(AvatarError::TooLarge { max_bytes });
   }
   AvatarContentType::parse(content_type.unwrap_or_default())
}

/// ストレージバケット内のオブジェクトキー
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{_0}")]
pub struct AvatarObjectKey(String);

impl AvatarObjectKey {
   /// 新しいオブジェクトキーを生成する
   ///
   /// 拡張子は元のファイル名から取り、使えない場合は MIME タイプから決める。
   pub fn generate(user_id: &str, file_name: Option<&str>, content_type: AvatarContentType) -> Self {
      let extension = file_name
         .and_then(extension_of)
         .unwrap_or_else(|| content_type.default_extension().to_string());

      Self(format!("{user_id}/{}.{extension}", Uuid::new_v4()))
   }

   /// 既存のキー文字列から作成する
   pub fn from_path(path: impl Into<String>) -> Self {
      Self(path.into())
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }
}

/// 公開 URL からバケット内のオブジェクトキーを取り出す
///
/// `.../storage/v1/object/public/{bucket}/{path}` 形式でない URL の場合は `None`。
///
/// ```
/// use eventive_domain::avatar::object_key_from_public_url;
///
/// let url = "https://x.supabase.co/storage/v1/object/public/avatars/u1/a.png";
/// assert_eq!(
///     object_key_from_public_url(url, "avatars").map(|k| k.to_string()),
///     Some("u1/a.png".to_string())
/// );
/// ```
pub fn object_key_from_public_url(url: &str, bucket: &str) -> Option<AvatarObjectKey> {
   let marker = format!("/storage/v1/object/public/{bucket}/");
   let (_, path) = url.split_once(&marker)?;
   let path = path.split(['?', '#']).next().unwrap_or_default();

   if path.is_empty() {
      return None;
   }
   Some(AvatarObjectKey::from_path(path))
}

/// ファイル名から小文字の拡張子を取り出す
///
/// 英数字のみ・5 文字以下の拡張子に限る。
fn extension_of(file_name: &str) -> Option<String> {
   let (stem, extension) = file_name.rsplit_once('.')?;
   let valid = !stem.is_empty()
      && (1..=5).contains(&extension.len())
      && extension.chars().all(|c| c.is_ascii_alphanumeric());

   valid.then(|| extension.to_ascii_lowercase())
}
