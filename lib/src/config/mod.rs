use std::env;

use config::{ConfigError, Environment, File};
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use self::kitchen_race::KitchenRaceConfig;

mod kitchen_race;

pub use kitchen_race::{ChallengeLimits, ResponseLimits};

pub fn load() -> Result<Config, ConfigError> {
    load_config()
}

pub fn load_database_config() -> Result<Database, ConfigError> {
    Ok(load_config::<DatabaseConfig>()?.database)
}

pub fn load_config<T: DeserializeOwned>() -> Result<T, ConfigError> {
    let path = env::var("CONFIG_PATH").unwrap_or("config.toml".to_owned());
    config::Config::builder()
        .add_source(File::with_name(&path))
        .add_source(Environment::default().separator("__"))
        .build()?
        .try_deserialize()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub jwt_secret: String,
    pub internal_jwt_ttl: u64,
    pub cache_ttl: u64,
    pub database: Database,
    pub redis: Redis,
    pub services: Services,
    pub kitchen_race: KitchenRaceConfig,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: Url,
    pub connect_timeout: u64,
}

#[derive(Debug, Deserialize)]
pub struct Redis {
    pub auth: Url,
    pub kitchen_race: Url,
}

#[derive(Debug, Deserialize)]
pub struct Services {
    pub storage: Url,
}
