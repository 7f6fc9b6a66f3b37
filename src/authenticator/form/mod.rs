
use std::sync::Arc;

use hyper::header::{HeaderValue, LOCATION};
use hyper::StatusCode;
use tracing::{debug, instrument};

use super::{Authentication, Authenticator, AuthenticatorBase, Credentials};
use crate::configuration::SharedLoginConfig;
use crate::error::Error;
use crate::http::{AuthRequest, AuthResponse, ParameterFilter};
use crate::keys::{form_keys, request_keys};
use crate::login_page::{FormLoginPage, LoginPageResolver};
use crate::secret::Secret;
use crate::security::{AuthenticationManager, CredentialTuple, SharedPrincipal};

/// Hooks of the form login flow.
///
/// [`authenticate_with`] drives the flow through these methods; schemes built
/// on top of form login hold a [`FormAuthenticator`] and override only the
/// steps that differ.
pub trait FormFlow: Send + Sync {
    fn form(&self) -> &FormAuthenticator;

    fn on_credentials(&self, request: &dyn AuthRequest) -> Credentials {
        form_credentials(request)
    }

    fn credentials(&self, credentials: &Credentials) -> CredentialTuple {
        CredentialTuple::Pair {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        }
    }

    fn login_page(&self, request: &dyn AuthRequest) -> Result<String, Error> {
        let form = self.form();
        form.login_page.login_page(request, &form.base.config())
    }

    fn forward_to_login_page(&self, request: &mut dyn AuthRequest, response: &mut dyn AuthResponse) {
        let location = self.login_page(&*request);
        self.form().redirect(location, request, response);
    }
}

/// `j_username` and `j_password` as posted by a login form.
pub fn form_credentials(request: &dyn AuthRequest) -> Credentials {
    let username = request.parameter(form_keys::USERNAME, ParameterFilter::StripLow);
    let password = request
        .parameter(form_keys::PASSWORD, ParameterFilter::UnsafeRaw)
        .map(Secret::new);

    Credentials {
        username,
        password,
        ..Credentials::default()
    }
}

/// Runs the form login cycle through the hooks of `flow`.
pub fn authenticate_with<F: FormFlow + ?Sized>(
    flow: &F,
    request: &mut dyn AuthRequest,
    response: &mut dyn AuthResponse,
) -> Authentication {
    let form = flow.form();
    let credentials = flow.on_credentials(&*request);

    if credentials.is_empty() {
        debug!("No credentials supplied, forwarding to login page");
        flow.forward_to_login_page(request, response);
        return Authentication::challenged(credentials);
    }

    let realm = match form.base.realm() {
        Ok(realm) => realm,
        Err(error) => {
            form.base
                .forward_to_configuration_error(request, response, &error);
            return Authentication::challenged(credentials);
        }
    };

    match realm.authenticate(&flow.credentials(&credentials)) {
        Some(principal) => form.base.register(request, principal),
        None => {
            debug!("Realm rejected form credentials");
            form.forward_to_error_page(credentials.username(), request, response);
        }
    }

    Authentication::challenged(credentials)
}

/// Login through an HTML form posting `j_username` and `j_password`.
pub struct FormAuthenticator {
    base: AuthenticatorBase,
    login_page: FormLoginPage,
}

impl FormAuthenticator {
    pub const AUTH_TYPE: &'static str = "Form";

    pub fn new(config: SharedLoginConfig, manager: Arc<dyn AuthenticationManager>) -> Self {
        Self::with_auth_type(Self::AUTH_TYPE, config, manager)
    }

    pub(crate) fn with_auth_type(
        auth_type: &'static str,
        config: SharedLoginConfig,
        manager: Arc<dyn AuthenticationManager>,
    ) -> Self {
        Self {
            base: AuthenticatorBase::new(auth_type, config, manager),
            login_page: FormLoginPage,
        }
    }

    /// Answers with a temporary redirect to `location`, or with a 500 when the
    /// location could not be resolved.
    pub fn redirect(
        &self,
        location: Result<String, Error>,
        request: &mut dyn AuthRequest,
        response: &mut dyn AuthResponse,
    ) {
        let header_value =
            location.and_then(|location| HeaderValue::from_str(&location).map_err(Error::from));

        match header_value {
            Ok(location) => {
                debug!("Redirecting to {location:?}");
                request.set_dispatched(true);
                response.set_status_code(StatusCode::TEMPORARY_REDIRECT);
                response.add_header(LOCATION, location);
            }
            Err(error) => {
                self.base
                    .forward_to_configuration_error(request, response, &error);
            }
        }
    }

    fn forward_to_error_page(
        &self,
        username: Option<&str>,
        request: &mut dyn AuthRequest,
        response: &mut dyn AuthResponse,
    ) {
        let config = self.base.config();

        if let Some(form_error_page) = config.form_error_page() {
            let location = match request.base_modifier() {
                Some(base_modifier) => format!("{base_modifier}{form_error_page}"),
                None => form_error_page.to_string(),
            };
            self.redirect(Ok(location), request, response);
            return;
        }

        let error = Error::Authentication(format!(
            "Can't authenticate user {}",
            username.unwrap_or_default()
        ));
        request.set_attribute(request_keys::ERROR_MESSAGE, error.to_string());
        request.set_dispatched(true);
        response.set_status_code(error.status_code());
    }
}

impl FormFlow for FormAuthenticator {
    fn form(&self) -> &FormAuthenticator {
        self
    }
}

impl Authenticator for FormAuthenticator {
    fn base(&self) -> &AuthenticatorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AuthenticatorBase {
        &mut self.base
    }

    #[instrument(skip_all, fields(auth_type = self.base.auth_type()))]
    fn authenticate(
        &self,
        request: &mut dyn AuthRequest,
        response: &mut dyn AuthResponse,
    ) -> Authentication {
        authenticate_with(self, request, response)
    }

    fn login(
        &self,
        username: &str,
        password: &str,
        request: &mut dyn AuthRequest,
    ) -> Result<SharedPrincipal, Error> {
        self.base.login(username, password, request)
    }

    fn logout(&self, request: &mut dyn AuthRequest) {
        if request.auth_type() != Some(self.base.auth_type()) {
            return;
        }

        debug!("Logging out {} principal", self.base.auth_type());
        request.set_user_principal(None);
        request.set_auth_type(None);
    }
}
