/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, CORS 許可, 認証バックエンド, ストレージなど)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 読み込みは lookup 関数経由 (テストでは HashMap を渡す)
 */
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Verification backends, in the order the verifier should try them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthBackend {
    Firebase,
    NextAuth,
}

impl FromStr for AuthBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firebase" => Ok(Self::Firebase),
            "nextauth" => Ok(Self::NextAuth),
            _ => Err(()),
        }
    }
}

/// What the list endpoints do for a caller without a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListPolicy {
    /// 401 for anonymous listing.
    #[default]
    RequireAuth,
    /// Anonymous listing returns every document.
    AllowAnonymousAll,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0} ({1})")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub jwks_url: Url,
    pub jwks_cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    // Ordered; never empty after validation.
    pub backends: Vec<AuthBackend>,
    pub nextauth_secret: Option<String>,
    pub firebase: Option<FirebaseConfig>,
    pub leeway_seconds: u64,
    pub provider_timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Postgres { database_url: String },
    Memory { seed_file: Option<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub list_policy: ListPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values behave like unset ones (`FOO=` in .env).
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = parse_or(&var, "PORT", 8080)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(var("APP_ENV"));

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout =
            Duration::from_secs(parse_or(&var, "REQUEST_TIMEOUT_SECONDS", 30)?);

        let storage = match var("DATABASE_URL") {
            Some(database_url) => StorageConfig::Postgres { database_url },
            None => StorageConfig::Memory {
                seed_file: var("SEED_FILE").map(PathBuf::from),
            },
        };

        let auth = auth_config(&var)?;

        let list_policy = match var("ANONYMOUS_LIST_POLICY")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("deny") => ListPolicy::RequireAuth,
            Some("all") => ListPolicy::AllowAnonymousAll,
            Some(other) => {
                return Err(ConfigError::Invalid(
                    "ANONYMOUS_LIST_POLICY",
                    format!("expected 'deny' or 'all', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            storage,
            auth,
            list_policy,
        })
    }
}

fn auth_config<F>(var: &F) -> Result<AuthConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let nextauth_secret = var("NEXTAUTH_SECRET");

    let firebase = match var("FIREBASE_PROJECT_ID").or_else(|| var("GOOGLE_CLOUD_PROJECT")) {
        Some(project_id) => {
            let raw = var("FIREBASE_JWKS_URL")
                .unwrap_or_else(|| DEFAULT_FIREBASE_JWKS_URL.to_string());
            let jwks_url = Url::parse(&raw)
                .map_err(|e| ConfigError::Invalid("FIREBASE_JWKS_URL", e.to_string()))?;
            if !matches!(jwks_url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(
                    "FIREBASE_JWKS_URL",
                    "must use http(s)".to_string(),
                ));
            }
            Some(FirebaseConfig {
                project_id,
                jwks_url,
                jwks_cache_ttl: Duration::from_secs(parse_or(var, "JWKS_CACHE_TTL_SECONDS", 3600)?),
            })
        }
        None => None,
    };

    let backends = match var("AUTH_BACKENDS") {
        Some(raw) => {
            let mut backends = Vec::new();
            for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let backend = name.parse::<AuthBackend>().map_err(|_| {
                    ConfigError::Invalid("AUTH_BACKENDS", format!("unknown backend '{name}'"))
                })?;
                if !backends.contains(&backend) {
                    backends.push(backend);
                }
            }
            backends
        }
        None => {
            // Firebase first, NextAuth as the fallback for older sessions.
            let mut backends = Vec::new();
            if firebase.is_some() {
                backends.push(AuthBackend::Firebase);
            }
            if nextauth_secret.is_some() {
                backends.push(AuthBackend::NextAuth);
            }
            backends
        }
    };

    if backends.is_empty() {
        return Err(ConfigError::Missing("NEXTAUTH_SECRET or FIREBASE_PROJECT_ID"));
    }
    for backend in &backends {
        match backend {
            AuthBackend::Firebase if firebase.is_none() => {
                return Err(ConfigError::Missing("FIREBASE_PROJECT_ID"));
            }
            AuthBackend::NextAuth if nextauth_secret.is_none() => {
                return Err(ConfigError::Missing("NEXTAUTH_SECRET"));
            }
            _ => {}
        }
    }

    Ok(AuthConfig {
        backends,
        nextauth_secret,
        firebase,
        leeway_seconds: parse_or(var, "AUTH_LEEWAY_SECONDS", 60)?,
        provider_timeout: Duration::from_secs(parse_or(
            var,
            "IDENTITY_PROVIDER_TIMEOUT_SECONDS",
            5,
        )?),
    })
}

fn parse_or<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::Invalid(key, e.to_string())),
        None => Ok(default),
    }
}
