#![forbid(unsafe_code)]
#![warn(clippy::dbg_macro, clippy::use_debug, clippy::todo)]

use fnct::{backend::AsyncRedisBackend, format::JsonFormatter, AsyncCache};
use sea_orm::DatabaseConnection;

use crate::{jwt::JwtSecret, redis::RedisConnection, services::Services};

pub mod auth;
pub mod config;
pub mod jwt;
pub mod redis;
pub mod services;

pub type CacheBackend = AsyncRedisBackend<RedisConnection>;
pub type Cache<F = JsonFormatter> = AsyncCache<CacheBackend, F>;
pub type CacheError<F = JsonFormatter> = fnct::Error<CacheBackend, F>;

#[derive(Debug, Clone)]
pub struct SharedState {
    pub jwt_secret: JwtSecret,
    pub auth_redis: RedisConnection,
    pub services: Services,
    pub cache: Cache,
    pub db: DatabaseConnection,
}
