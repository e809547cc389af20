/*
 * Responsibility
 * - Handler から見える「認証コンテキスト」の型
 * - extractor が TokenVerifier で検証し、handler はこの型だけを受け取る
 *
 * Notes
 * - 署名検証 / strategy chain は services::auth の責務
 * - 所有者チェックは services::access_guard の責務 (ここでは持たない)
 */

use crate::services::auth::CallerIdentity;

/// `Authorization: Bearer <token>` の生の値 (未検証)
///
/// - header 無し / 別 scheme / 空の credentials → `None` (匿名扱い)
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// 検証済みのリクエストに付与されるコンテキスト
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: CallerIdentity,
}

impl AuthCtx {
    pub fn new(user_id: CallerIdentity) -> Self {
        Self { user_id }
    }
}

/// 匿名を許す endpoint 用。token が無ければ `None`
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthCtx(pub Option<AuthCtx>);

impl MaybeAuthCtx {
    pub fn caller(&self) -> Option<&str> {
        self.0.as_ref().map(|ctx| ctx.user_id.as_str())
    }
}

/// 一覧系 endpoint の対象範囲 (list policy の適用結果)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    Owner(CallerIdentity),
    Everything,
}
