//! # ドメイン層エラー定義
//!
//! リモート呼び出しの前にローカルで判定できるルール違反を表現する。
//! いずれも API 層で 400 Bad Request に変換される。
//!
//! `Display` の文言はそのままクライアントへ返すため、内部情報を含めないこと。

use thiserror::Error;

/// アバターアップロードの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvatarError {
   /// ファイルが添付されていない、または空
   #[error("No file provided")]
   Missing,

   /// 上限サイズ超過
   #[error("File size exceeds maximum allowed size of {}MB", max_bytes / 1024 / 1024)]
   TooLarge {
      /// 設定された上限（バイト）
      max_bytes: u64,
   },

   /// 許可されていない MIME タイプ
   #[error("Invalid file type. Only JPEG, PNG, GIF, and WebP images are allowed")]
   UnsupportedType(String),
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_too_largeのメッセージはmib単位で上限を示す() {
      let error = AvatarError::TooLarge {
         max_bytes: 5 * 1024 * 1024,
      };

      assert_eq!(
         error.to_string(),
         "File size exceeds maximum allowed size of 5MB"
      );
   }

   #[test]
   fn test_unsupported_typeのメッセージに受信したmimeを含めない() {
      let error = AvatarError::UnsupportedType("text/<script>".to_string());

      assert!(!error.to_string().contains("<script>"));
   }
}
