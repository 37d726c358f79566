mod config;

use std::time::Duration;

use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use questline_core::AppState;
use questline_database::model::course::builtin_catalog;
use questline_database::{CacheService, CatalogCache, Database, MIGRATOR};
use questline_runner::RunnerService;

use config::{env_bool, env_u64, token_verifier_from_env};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !metadata.target().starts_with("sqlx::query")
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let db = match std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()) {
        Some(database_url) => connect_database(&database_url).await?,
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store. Profiles are lost on restart.");
            Database::in_memory(builtin_catalog())
        }
    };

    let catalog = CatalogCache::new(Duration::from_secs(env_u64("CATALOG_REFRESH_SECONDS", 3600)));
    let courses = catalog.refresh(&db).await?;
    info!(
        courses = courses.len(),
        persistent = db.is_persistent(),
        refresh_seconds = catalog.max_age().as_secs(),
        "Course catalog loaded."
    );
    catalog.spawn_refresh_task(db.clone());

    let auth = token_verifier_from_env()?;

    let runner = RunnerService::from_env_optional()?;
    if runner.is_none() {
        info!("Code runner disabled (set RUNNER_ENABLED=true to enable /compile).");
    }

    let state = AppState {
        db,
        catalog,
        auth,
        runner,
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any)
        .max_age(Duration::from_secs(60 * 60));

    let app = questline_routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let port = env_u64("PORT", 3000);
    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address).await?;
    info!(%address, "Questline is listening.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Questline shut down.");
    Ok(())
}

async fn connect_database(database_url: &str) -> anyhow::Result<Database> {
    let max_connections = u32::try_from(env_u64("DATABASE_MAX_CONNECTIONS", 5)).unwrap_or(5);
    let db_pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    info!(max_connections, "PostgreSQL connection established.");

    let cache = cache_from_env().await;
    let db = Database::with_cache(db_pool.clone(), cache);

    if env_bool("AUTO_RUN_MIGRATIONS", true) {
        MIGRATOR.run(&db_pool).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    Ok(db)
}

async fn cache_from_env() -> CacheService {
    let redis_key_prefix =
        std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "questline:prod".to_string());

    if !env_bool("REDIS_ENABLED", false) {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        return CacheService::disabled(redis_key_prefix);
    }

    let cache = match std::env::var("REDIS_URL") {
        Ok(redis_url) => match CacheService::redis(&redis_url, redis_key_prefix.clone()) {
            Ok(cache) => {
                info!(key_prefix = %redis_key_prefix, "Redis cache enabled.");
                cache
            }
            Err(err) => {
                warn!(?err, key_prefix = %redis_key_prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
                return CacheService::disabled(redis_key_prefix);
            }
        },
        Err(_) => {
            warn!(key_prefix = %redis_key_prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
            return CacheService::disabled(redis_key_prefix);
        }
    };

    if let Err(err) = cache.ping().await {
        warn!(
            ?err,
            "Redis cache ping failed; cache operations will continue with fallback behavior."
        );
    } else {
        info!("Redis cache health check passed.");
    }

    cache
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(?err, "Failed to listen for Ctrl+C.");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down.");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down.");
            }
            Err(err) => {
                warn!(?err, "Failed to install SIGTERM handler.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
