use std::sync::Arc;

use poem::Request;
use poem_ext::responses::MetaResponsesExt;
use poem_openapi::{
    auth::Bearer,
    payload::Json,
    registry::{MetaResponse, Registry},
    ApiResponse, Object,
};
use uuid::Uuid;

use crate::{
    jwt::{verify_jwt, UserAccessToken},
    SharedState,
};

#[derive(Debug)]
pub struct User {
    pub id: Uuid,
    pub email_verified: bool,
    pub admin: bool,
}

/// Requires a valid access token of a user with a verified email address.
#[derive(Debug)]
pub struct VerifiedUserAuth(pub User);

/// Requires a valid access token of an administrator.
#[derive(Debug)]
pub struct AdminAuth(pub User);

async fn user_auth_check(req: &Request, token: Option<Bearer>) -> Result<User, Response> {
    let Bearer { token } =
        token.ok_or_else(|| Response::unauthorized("No bearer token in Authorization header"))?;
    let state = req
        .data::<Arc<SharedState>>()
        .expect("request does not have SharedState data");
    let access_token = verify_jwt::<UserAccessToken>(&token, &state.jwt_secret)
        .map_err(|_| Response::unauthorized("Invalid bearer token"))?;
    let mut auth_redis = state.auth_redis.clone();
    if access_token
        .is_revoked(&mut auth_redis)
        .await
        .unwrap_or(true)
    {
        return Err(Response::unauthorized("Session has been logged out"));
    }
    let id = access_token
        .uid
        .parse()
        .map_err(|_| Response::unauthorized("Invalid user id in bearer token"))?;
    Ok(User {
        id,
        email_verified: access_token.data.email_verified,
        admin: access_token.data.admin,
    })
}

async fn verified_user_auth_check(req: &Request, token: Option<Bearer>) -> Result<User, Response> {
    let user = user_auth_check(req, token).await?;
    match user.email_verified {
        true => Ok(user),
        false => Err(Response::forbidden("Unverified user email")),
    }
}

async fn admin_auth_check(req: &Request, token: Option<Bearer>) -> Result<User, Response> {
    let user = user_auth_check(req, token).await?;
    match user.admin {
        true => Ok(user),
        false => Err(Response::forbidden("User is not an administrator")),
    }
}

impl MetaResponsesExt for VerifiedUserAuth {
    type Iter = Vec<MetaResponse>;
    fn responses() -> Self::Iter {
        Response::meta().responses
    }
    fn register(registry: &mut Registry) {
        Response::register(registry);
    }
}

impl MetaResponsesExt for AdminAuth {
    type Iter = Vec<MetaResponse>;
    fn responses() -> Self::Iter {
        Response::meta().responses
    }
    fn register(registry: &mut Registry) {
        Response::register(registry);
    }
}

macro_rules! impl_api_extractor {
    ($auth:ident, $checker:expr) => {
        #[poem::async_trait]
        impl<'a> poem_openapi::ApiExtractor<'a> for $auth {
            const TYPES: &'static [poem_openapi::ApiExtractorType] =
                &[poem_openapi::ApiExtractorType::SecurityScheme];

            type ParamType = ();
            type ParamRawType = ();

            async fn from_request(
                request: &'a Request,
                _body: &mut poem::RequestBody,
                _param_opts: poem_openapi::ExtractParamOptions<Self::ParamType>,
            ) -> poem::Result<Self> {
                let output =
                    <Bearer as poem_openapi::auth::BearerAuthorization>::from_request(request).ok();
                let checker = $checker;
                let output = checker(request, output).await?;
                Ok(Self(output))
            }

            fn register(registry: &mut poem_openapi::registry::Registry) {
                registry.create_security_scheme(
                    stringify!($auth),
                    poem_openapi::registry::MetaSecurityScheme {
                        ty: "http",
                        description: None,
                        name: None,
                        key_in: None,
                        scheme: Some("bearer"),
                        bearer_format: None,
                        flows: None,
                        openid_connect_url: None,
                    },
                );
            }

            fn security_schemes() -> Vec<&'static str> {
                vec![stringify!($auth)]
            }
        }
    };
}

impl_api_extractor!(VerifiedUserAuth, verified_user_auth_check);
impl_api_extractor!(AdminAuth, admin_auth_check);

#[derive(Object)]
struct Error {
    error: String,
    reason: String,
}

#[derive(ApiResponse)]
enum Response {
    /// The user is unauthenticated.
    #[oai(status = 401)]
    Unauthorized(Json<Error>),
    /// The authenticated user is not allowed to perform this action.
    #[oai(status = 403)]
    Forbidden(Json<Error>),
}

impl Response {
    fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(Json(Error {
            error: "unauthorized".into(),
            reason: reason.into(),
        }))
    }

    fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(Json(Error {
            error: "forbidden".into(),
            reason: reason.into(),
        }))
    }
}
