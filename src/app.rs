/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (repo / TokenVerifier) → Router 組み立て
 * - Middleware の適用 (CORS / request-id / timeout / trace)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::{Config, StorageConfig},
    middleware,
    repos::{CardRepo, MemoryRepo, PgRepo, StrategyRepo},
    services::auth::build_token_verifier,
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG=info,strategy_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: fail fast
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("invalid configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let (strategies, cards): (Arc<dyn StrategyRepo>, Arc<dyn CardRepo>) = match &config.storage {
        StorageConfig::Postgres { database_url } => {
            let repo = Arc::new(
                PgRepo::connect(database_url)
                    .await
                    .context("failed to connect to postgres")?,
            );
            tracing::info!("storage: postgres");
            split(repo)
        }
        StorageConfig::Memory { seed_file } => {
            let repo = match seed_file {
                Some(path) => MemoryRepo::from_seed_file(path).await?,
                None => MemoryRepo::default(),
            };
            tracing::info!(strategies = repo.strategy_count(), "storage: in-memory");
            split(Arc::new(repo))
        }
    };

    // Missing settings for a selected backend are fatal here, not per request.
    let verifier = build_token_verifier(&config.auth)?;
    tracing::info!(backends = ?verifier.strategy_names(), "token verification chain ready");

    Ok(AppState::new(verifier, strategies, cards, config.list_policy))
}

fn split<R>(repo: Arc<R>) -> (Arc<dyn StrategyRepo>, Arc<dyn CardRepo>)
where
    R: StrategyRepo + CardRepo + 'static,
{
    (repo.clone(), repo)
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::router(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
