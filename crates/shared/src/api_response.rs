//! # API レスポンスエンベロープ
//!
//! 成功レスポンスの統一形式 `{ "success": true, "data": T }` を提供する。
//! 失敗側の形式は [`crate::ErrorResponse`] を参照。

use serde::{Deserialize, Serialize};

/// 成功レスポンスの統一型
///
/// BFF のすべてのハンドラは成功時にこの型で包んで返す。
/// リモートバックエンド固有のレスポンス形状をそのまま返してはならない。
///
/// ## 使用例
///
/// ```
/// use eventive_shared::ApiResponse;
///
/// let response = ApiResponse::new("hello");
/// assert!(response.success);
/// assert_eq!(response.data, "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
   pub success: bool,
   pub data:    T,
}

impl<T> ApiResponse<T> {
   /// 新しい成功レスポンスを作成する
   pub fn new(data: T) -> Self {
      Self {
         success: true,
         data,
      }
   }
}
