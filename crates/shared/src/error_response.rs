//! # エラーレスポンス
//!
//! 失敗レスポンスの統一形式 `{ "success": false, "error": { "message": ... } }` を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - HTTP ステータスはボディに含めない（ステータスラインで表現する）
//! - `detail` は開発モードでのみ設定し、本番では省略する

use serde::{Deserialize, Serialize};

/// エラー本体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
   /// クライアントに表示してよいメッセージ
   pub message: String,
   /// 内部エラーの詳細（開発モードのみ）
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub detail:  Option<String>,
}

/// 失敗レスポンスの統一型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   pub success: bool,
   pub error:   ErrorBody,
}

impl ErrorResponse {
   /// メッセージを指定してエラーレスポンスを作成する
   pub fn new(message: impl Into<String>) -> Self {
      Self {
         success: false,
         error:   ErrorBody {
            message: message.into(),
            detail:  None,
         },
      }
   }

   /// 内部エラーの詳細を付与する
   pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
      self.error.detail = Some(detail.into());
      self
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_newでsuccess_falseとmessageが設定される() {
      let error = ErrorResponse::new("Profile not found");

      assert!(!error.success);
      assert_eq!(error.error.message, "Profile not found");
      assert_eq!(error.error.detail, None);
   }

   #[test]
   fn test_detailなしのときjsonにdetailが含まれない() {
      let json = serde_json::to_value(ErrorResponse::new("Invalid or expired token")).unwrap();

      assert_eq!(
         json,
         serde_json::json!({
            "success": false,
            "error": { "message": "Invalid or expired token" }
         })
      );
   }

   #[test]
   fn test_with_detailでdetailがjsonに出力される() {
      let error = ErrorResponse::new("Internal Server Error").with_detail("接続がリセットされました");
      let json = serde_json::to_value(&error).unwrap();

      assert_eq!(json["error"]["message"], "Internal Server Error");
      assert_eq!(json["error"]["detail"], "接続がリセットされました");
   }

   #[test]
   fn test_detailなしのjsonをデシリアライズできる() {
      let json = r#"{"success": false, "error": {"message": "Too many requests"}}"#;
      let error: ErrorResponse = serde_json::from_str(json).unwrap();

      assert!(!error.success);
      assert_eq!(error.error.message, "Too many requests");
      assert_eq!(error.error.detail, None);
   }
}
