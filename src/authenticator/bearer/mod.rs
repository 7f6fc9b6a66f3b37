
use std::sync::{Arc, LazyLock};

use hyper::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::StatusCode;
use regex::Regex;
use serde_json::json;
use tracing::{debug, instrument};

use super::{Authentication, Authenticator, AuthenticatorBase, Credentials};
use crate::configuration::SharedLoginConfig;
use crate::error::Error;
use crate::http::{AuthRequest, AuthResponse};
use crate::secret::Secret;
use crate::security::{AuthenticationManager, CredentialTuple, SharedPrincipal};

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Bearer\s+(?P<token>\S+)").unwrap());

static INVALID_TOKEN_MESSAGE: &str = "You need a valid access token to use the API";

/// Access token from an `Authorization: Bearer <token>` header value.
fn bearer_token(authorization: &str) -> Option<&str> {
    BEARER_RE
        .captures(authorization)
        .and_then(|captures| captures.name("token"))
        .map(|token| token.as_str())
}

/// Stateless authentication with an opaque access token.
///
/// The token is handed to the realm as the username with an empty password;
/// the realm decides what it means.
pub struct BearerAuthenticator {
    base: AuthenticatorBase,
}

impl BearerAuthenticator {
    pub const AUTH_TYPE: &'static str = "Bearer";

    pub fn new(config: SharedLoginConfig, manager: Arc<dyn AuthenticationManager>) -> Self {
        Self {
            base: AuthenticatorBase::new(Self::AUTH_TYPE, config, manager),
        }
    }

    fn on_credentials(request: &dyn AuthRequest) -> Credentials {
        let username = request
            .header(AUTHORIZATION.as_str())
            .and_then(|authorization| bearer_token(&authorization).map(ToString::to_string));

        if username.is_none() {
            debug!("No bearer token found in request");
        }

        Credentials {
            username,
            ..Credentials::default()
        }
    }

    fn credentials(credentials: &Credentials) -> CredentialTuple {
        CredentialTuple::Pair {
            username: credentials.username.clone(),
            password: Some(Secret::default()),
        }
    }

    fn forward_to_error_page(request: &mut dyn AuthRequest, response: &mut dyn AuthResponse) {
        let body = json!({ "error": INVALID_TOKEN_MESSAGE });

        request.set_dispatched(true);
        response.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response.append_body(body.to_string().as_bytes());
        response.set_status_code(StatusCode::UNAUTHORIZED);
    }
}

impl Authenticator for BearerAuthenticator {
    fn base(&self) -> &AuthenticatorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AuthenticatorBase {
        &mut self.base
    }

    #[instrument(skip_all, fields(auth_type = Self::AUTH_TYPE))]
    fn authenticate(
        &self,
        request: &mut dyn AuthRequest,
        response: &mut dyn AuthResponse,
    ) -> Authentication {
        let credentials = Self::on_credentials(request);

        let realm = match self.base.realm() {
            Ok(realm) => realm,
            Err(error) => {
                self.base
                    .forward_to_configuration_error(request, response, &error);
                return Authentication::challenged(credentials);
            }
        };

        match realm.authenticate(&Self::credentials(&credentials)) {
            Some(principal) => self.base.register(request, principal),
            None => {
                debug!("Realm rejected bearer token");
                Self::forward_to_error_page(request, response);
            }
        }

        Authentication::challenged(credentials)
    }

    fn login(
        &self,
        username: &str,
        password: &str,
        request: &mut dyn AuthRequest,
    ) -> Result<SharedPrincipal, Error> {
        self.base.login(username, password, request)
    }

    fn logout(&self, _request: &mut dyn AuthRequest) {}
}
