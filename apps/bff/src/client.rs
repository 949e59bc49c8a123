//! # 外部 API クライアント
//!
//! リモートバックエンド（Supabase）との通信を担当する。

pub mod supabase;

pub use supabase::{
   AuthUser,
   ProfileUpdate,
   SupabaseAuthClient,
   SupabaseClient,
   SupabaseClientImpl,
   SupabaseError,
   SupabaseProfileClient,
   SupabaseStorageClient,
};
