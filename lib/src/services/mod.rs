use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use thiserror::Error;
use url::Url;

use self::storage::StorageService;
use crate::jwt::{sign_jwt, InternalAuthToken, JwtSecret};

pub mod storage;

#[derive(Debug, Clone)]
pub struct Services {
    pub storage: StorageService,
}

impl Services {
    pub fn from_config(
        jwt_secret: JwtSecret,
        jwt_ttl: Duration,
        conf: &crate::config::Services,
    ) -> Self {
        let jwt_config = Arc::new(JwtConfig {
            secret: jwt_secret,
            ttl: jwt_ttl,
        });
        Self {
            storage: StorageService::new(Service::new("storage", conf.storage.clone(), jwt_config)),
        }
    }
}

#[derive(Debug, Clone)]
struct JwtConfig {
    secret: JwtSecret,
    ttl: Duration,
}

#[derive(Debug, Clone)]
struct Service {
    name: &'static str,
    base_url: Url,
    jwt_config: Arc<JwtConfig>,
}

impl Service {
    fn new(name: &'static str, base_url: Url, jwt_config: Arc<JwtConfig>) -> Self {
        Self {
            name,
            base_url,
            jwt_config,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = sign_jwt(
            InternalAuthToken {
                aud: self.name.into(),
            },
            &self.jwt_config.secret,
            self.jwt_config.ttl,
        )
        .expect("could not sign internal auth token");
        Client::new()
            .request(
                method,
                self.base_url
                    .join(&format!("_internal/{}", path.trim_start_matches('/')))
                    .expect("could not build url"),
            )
            .bearer_auth(token)
    }
}

macro_rules! methods {
    ($($method:ident),*) => {
        paste::paste! {
            $(
                #[allow(dead_code)]
                fn $method(&self, path: &str) -> RequestBuilder {
                    self.request(Method::[< $method:upper >], path)
                }
            )*
        }
    };
}

impl Service {
    methods!(get, post, put, patch, delete, head);
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("unexpected response status code: {0}")]
    UnexpectedStatusCode(StatusCode),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
