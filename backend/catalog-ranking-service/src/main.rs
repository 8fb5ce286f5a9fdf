use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_ranking_service::db::{self, CatalogStore, PgCatalogStore, PgStatsStore};
use catalog_ranking_service::jobs::start_ranking_refresher;
use catalog_ranking_service::{handlers, metrics, Config, RankingService, SERVICE_NAME};

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,actix_web=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_line_number(true),
        )
        .init();
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn log_server_exit(result: Result<std::io::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => tracing::info!("HTTP server stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server exited with error"),
        Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;

    tracing::info!("Starting {} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    config.database.pool.log_config();
    let pool = db_pool::create_pool(config.database.pool.clone())
        .await
        .context("Failed to create database pool")?;

    if config.database.run_migrations {
        db::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let ranking_service = Arc::new(RankingService::new(
        Arc::new(PgStatsStore::new(pool.clone())),
        config.ranking.service_config(),
    ));
    let catalog_store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(
        pool.clone(),
        config.ranking.query_timeout(),
    ));

    let refresher = config.ranking.refresh_interval().map(|interval| {
        tokio::spawn(start_ranking_refresher(Arc::clone(&ranking_service), interval))
    });
    if refresher.is_none() {
        tracing::info!("Periodic ranking refresh disabled");
    }

    let ranking_data = web::Data::from(Arc::clone(&ranking_service));
    let catalog_data = web::Data::from(catalog_store);
    let cors_config = config.cors.clone();

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server on {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_config.origins() {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(ranking_data.clone())
            .app_data(catalog_data.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route("/health", web::get().to(handlers::health))
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .workers(config.app.workers)
    .shutdown_timeout(30)
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            log_server_exit(result);
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping HTTP server");
            server_handle.stop(true).await;
            log_server_exit(server_task.await);
        }
    }

    if let Some(refresher) = refresher {
        refresher.abort();
    }

    db_pool::close_pool(&pool, SERVICE_NAME).await;
    tracing::info!("{} stopped", SERVICE_NAME);
    Ok(())
}
