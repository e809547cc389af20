/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("failed to read seed file {path}: {source}")]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed file {path}: {source}")]
    SeedFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
