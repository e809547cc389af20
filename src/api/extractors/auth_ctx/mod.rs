/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - bearer token を TokenVerifier で検証し、handler に認証コンテキストを提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - BearerToken (未検証の token。匿名可)
 * - AuthCtx (検証済みの caller)
 * - MaybeAuthCtx (認証任意)
 * - ListScope (list policy 適用済みの一覧範囲)
 */

mod core;
mod types;

pub use types::{AuthCtx, BearerToken, ListScope, MaybeAuthCtx};
