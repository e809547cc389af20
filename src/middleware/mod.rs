/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 認証は middleware ではなく extractor (api::extractors) で行う
 */
pub mod cors;
pub mod http;
