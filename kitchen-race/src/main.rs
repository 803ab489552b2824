#![forbid(unsafe_code)]
#![warn(clippy::dbg_macro, clippy::use_debug, clippy::todo)]

use std::{sync::Arc, time::Duration};

use fnct::{backend::AsyncRedisBackend, format::JsonFormatter};
use lib::{config, jwt::JwtSecret, redis::RedisConnection, services::Services, Cache, SharedState};
use poem::{listener::TcpListener, middleware::Tracing, EndpointExt, Route, Server};
use poem_ext::{db::DbTransactionMiddleware, panic_handler::PanicHandler};
use poem_openapi::OpenApiService;
use sea_orm::{ConnectOptions, Database};
use tracing::info;

use crate::{endpoints::get_api, services::watch::WatchHub};

mod endpoints;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Loading config");
    let config = Arc::new(config::load()?);

    info!("Connecting to database");
    let mut db_options = ConnectOptions::new(config.database.url.to_string());
    db_options.connect_timeout(Duration::from_secs(config.database.connect_timeout));
    let db = Database::connect(db_options).await?;

    info!("Connecting to redis");
    let cache = Cache::new(
        AsyncRedisBackend::new(
            RedisConnection::new(config.redis.kitchen_race.as_str()).await?,
            "kitchen_race".into(),
        ),
        JsonFormatter,
        Duration::from_secs(config.cache_ttl),
    );
    let auth_redis = RedisConnection::new(config.redis.auth.as_str()).await?;

    let jwt_secret = JwtSecret::try_from(config.jwt_secret.as_str())?;
    let services = Services::from_config(
        jwt_secret.clone(),
        Duration::from_secs(config.internal_jwt_ttl),
        &config.services,
    );
    let shared_state = Arc::new(SharedState {
        jwt_secret,
        auth_redis,
        services,
        cache,
        db: db.clone(),
    });
    let watch_hub = Arc::new(WatchHub::new());

    let api_service = OpenApiService::new(
        get_api(shared_state.clone(), Arc::clone(&config), watch_hub),
        "Colocs Kitchen Race: Challenges Microservice",
        env!("CARGO_PKG_VERSION"),
    )
    .external_document("/openapi.json")
    .server(config.kitchen_race.server.to_string());
    let app = Route::new()
        .nest("/openapi.json", api_service.spec_endpoint())
        .nest("/docs", api_service.swagger_ui())
        .nest("/redoc", api_service.redoc())
        .nest("/", api_service)
        .with(Tracing)
        .with(PanicHandler::middleware())
        .with(DbTransactionMiddleware::new(db))
        .data(shared_state);

    info!(
        "Listening on {}:{}",
        config.kitchen_race.host, config.kitchen_race.port
    );
    Server::new(TcpListener::bind((
        config.kitchen_race.host.as_str(),
        config.kitchen_race.port,
    )))
    .run(app)
    .await?;

    Ok(())
}
