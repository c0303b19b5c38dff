use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use headshot_backend::{
    config::Config,
    db::{
        postgres_headshot_repository::PostgresHeadshotRepository,
        postgres_subscription_repository::PostgresSubscriptionRepository,
        postgres_user_repository::PostgresUserRepository,
        postgres_webhook_event_repository::PostgresWebhookEventRepository,
    },
    responses::JsonResponse,
    routes,
    services::{
        auth::client::SupabaseAuthClient, billing::live::PolarBillingService,
        generation::gemini::GeminiImageGenerator,
    },
    AppState,
};
use reqwest::Client;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the tracing stack. The returned guard keeps Sentry flushing
/// until shutdown.
fn init_tracing() -> Option<sentry::ClientInitGuard> {
    let sentry_guard = std::env::var("SENTRY_DSN")
        .ok()
        .filter(|dsn| !dsn.trim().is_empty())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ))
        });

    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .with(sentry_guard.as_ref().map(|_| sentry_tracing::layer()))
        .init();

    sentry_guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _sentry = init_tracing();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        environment = config.environment.as_str(),
        site_url = %config.site_url,
        "starting headshot backend"
    );

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(config.rate_limit.per_millisecond)
            .burst_size(config.rate_limit.burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limiter settings"))?,
    );

    // Drop idle client entries from the limiter map.
    let governor_limiter = governor_conf.limiter().clone();
    std::thread::spawn(move || loop {
        std::thread::sleep(Duration::from_secs(60));
        governor_limiter.retain_recent();
    });

    let pg_pool = establish_connection(&config.database_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("failed to run database migrations")?;

    let http_client = Client::new();
    let config = Arc::new(config);
    let state = AppState {
        users: Arc::new(PostgresUserRepository {
            pool: pg_pool.clone(),
        }),
        subscriptions: Arc::new(PostgresSubscriptionRepository {
            pool: pg_pool.clone(),
        }),
        webhook_events: Arc::new(PostgresWebhookEventRepository {
            pool: pg_pool.clone(),
        }),
        headshots: Arc::new(PostgresHeadshotRepository { pool: pg_pool }),
        auth: Arc::new(SupabaseAuthClient {
            client: http_client.clone(),
            settings: config.supabase.clone(),
        }),
        billing: Arc::new(PolarBillingService::new(
            http_client.clone(),
            config.polar.clone(),
        )),
        generator: Arc::new(GeminiImageGenerator::new(
            http_client,
            config.gemini.clone(),
        )),
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .site_url
                .parse::<HeaderValue>()
                .context("SITE_URL is not a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let app = routes::app(
        state,
        GovernorLayer {
            config: governor_conf,
        },
    )
    .layer(cors);

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, make_service).await?;
    Ok(())
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to verify database connection")?;

    info!("successfully connected to the database");
    Ok(pool)
}
