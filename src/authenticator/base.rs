use std::sync::Arc;

use hyper::StatusCode;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::configuration::{LoginConfig, SharedLoginConfig};
use crate::error::Error;
use crate::http::{AuthRequest, AuthResponse};
use crate::keys::request_keys;
use crate::secret::Secret;
use crate::security::{AuthenticationManager, CredentialTuple, Realm, SharedPrincipal};

/// State and behaviour shared by every authenticator.
pub struct AuthenticatorBase {
    serial: Uuid,
    auth_type: &'static str,
    default_authenticator: bool,
    config: SharedLoginConfig,
    manager: Arc<dyn AuthenticationManager>,
}

impl AuthenticatorBase {
    pub fn new(
        auth_type: &'static str,
        config: SharedLoginConfig,
        manager: Arc<dyn AuthenticationManager>,
    ) -> Self {
        debug_assert!(!auth_type.is_empty());

        let default_authenticator = config.load().default_authenticator.unwrap_or(false);

        Self {
            serial: Uuid::new_v4(),
            auth_type,
            default_authenticator,
            config,
            manager,
        }
    }

    pub fn serial(&self) -> Uuid {
        self.serial
    }

    pub fn auth_type(&self) -> &'static str {
        self.auth_type
    }

    pub fn config(&self) -> Arc<LoginConfig> {
        self.config.load_full()
    }

    pub fn manager(&self) -> &Arc<dyn AuthenticationManager> {
        &self.manager
    }

    pub fn realm_name(&self) -> String {
        self.config.load().realm_name.clone()
    }

    pub fn is_default_authenticator(&self) -> bool {
        self.default_authenticator
    }

    pub fn set_default_authenticator(&mut self) {
        self.default_authenticator = true;
    }

    pub fn realm(&self) -> Result<Arc<dyn Realm>, Error> {
        let realm_name = self.realm_name();
        self.manager.realm(&realm_name).ok_or_else(|| {
            let msg = format!("Can't find realm '{realm_name}' for auth-method '{}'", self.auth_type);
            Error::Configuration(msg)
        })
    }

    /// Attaches the principal and this scheme's auth type to the request.
    pub fn register(&self, request: &mut dyn AuthRequest, principal: SharedPrincipal) {
        debug!("Registering principal '{}' as {}", principal.name(), self.auth_type);
        request.set_user_principal(Some(principal));
        request.set_auth_type(Some(self.auth_type));
    }

    #[instrument(skip(self, password, request), fields(auth_type = self.auth_type))]
    pub fn login(
        &self,
        username: &str,
        password: &str,
        request: &mut dyn AuthRequest,
    ) -> Result<SharedPrincipal, Error> {
        let realm = self.realm()?;

        let credentials = CredentialTuple::Pair {
            username: Some(username.to_string()),
            password: Some(Secret::from(password)),
        };

        let Some(principal) = realm.authenticate(&credentials) else {
            debug!("Realm rejected login");
            return Err(Error::Authentication(format!(
                "Can't authenticate user {username}"
            )));
        };

        self.register(request, principal.clone());
        Ok(principal)
    }

    /// Turns a configuration problem into a 500 response, exposing the message
    /// to the host through the `error_message` request attribute.
    pub fn forward_to_configuration_error(
        &self,
        request: &mut dyn AuthRequest,
        response: &mut dyn AuthResponse,
        error: &Error,
    ) {
        warn!("{} authentication misconfigured: {error}", self.auth_type);
        request.set_attribute(request_keys::ERROR_MESSAGE, error.to_string());
        request.set_dispatched(true);
        response.set_status_code(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
