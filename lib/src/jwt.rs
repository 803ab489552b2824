use std::{
    borrow::Cow,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use hmac::{digest::InvalidLength, Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use redis::{AsyncCommands, RedisResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::Sha256;
use thiserror::Error;

use crate::redis::RedisConnection;

#[derive(Debug, Clone)]
pub struct JwtSecret(pub Hmac<Sha256>);

impl TryFrom<&str> for JwtSecret {
    type Error = InvalidLength;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(Self(Hmac::<Sha256>::new_from_slice(value.as_bytes())?))
    }
}

/// Access token issued by the auth service. The claim layout is shared
/// with the other microservices and must not change here.
#[derive(Serialize, Deserialize)]
pub struct UserAccessToken {
    pub uid: String,
    pub rt: String,
    pub data: UserAccessTokenData,
}

impl UserAccessToken {
    /// Whether the session this token belongs to has been logged out.
    pub async fn is_revoked(&self, redis: &mut RedisConnection) -> RedisResult<bool> {
        redis.exists(format!("session_logout:{}", self.rt)).await
    }
}

#[derive(Serialize, Deserialize)]
pub struct UserAccessTokenData {
    pub email_verified: bool,
    pub admin: bool,
}

/// Token used to authenticate requests between microservices.
#[derive(Serialize, Deserialize)]
pub struct InternalAuthToken {
    pub aud: Cow<'static, str>,
}

pub fn sign_jwt(
    data: impl Serialize,
    secret: &JwtSecret,
    ttl: Duration,
) -> Result<String, JwtError> {
    let Value::Object(mut claims) = serde_json::to_value(data)? else {
        return Err(JwtError::NotAnObject);
    };
    claims.insert(
        "exp".into(),
        json!((SystemTime::now().duration_since(UNIX_EPOCH).unwrap() + ttl).as_secs()),
    );
    Ok(Value::Object(claims).sign_with_key(&secret.0)?)
}

pub fn verify_jwt<T: DeserializeOwned>(token: &str, secret: &JwtSecret) -> Result<T, JwtError> {
    let claims = VerifyWithKey::<Map<String, Value>>::verify_with_key(token, &secret.0)?;

    let exp = claims
        .get("exp")
        .and_then(Value::as_u64)
        .ok_or(JwtError::NoExpiration)?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    if exp <= now {
        return Err(JwtError::Expired(exp));
    }

    Ok(serde_json::from_value(Value::Object(claims))?)
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("jwt error: {0}")]
    JwtError(#[from] jwt::Error),
    #[error("deserialization error: {0}")]
    DeserializationError(#[from] serde_json::Error),
    #[error("token expired at t={0}")]
    Expired(u64),
    #[error("no exp field in token")]
    NoExpiration,
    #[error("can only sign json objects")]
    NotAnObject,
}
