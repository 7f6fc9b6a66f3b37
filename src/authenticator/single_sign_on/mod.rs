
use std::sync::Arc;

use tracing::{debug, instrument};

use super::form::{authenticate_with, form_credentials};
use super::{Authentication, Authenticator, AuthenticatorBase, Credentials, FormAuthenticator, FormFlow};
use crate::configuration::SharedLoginConfig;
use crate::error::Error;
use crate::http::{AuthRequest, AuthResponse, ParameterFilter};
use crate::keys::form_keys;
use crate::login_page::{FormLoginPage, IdentityProviderRedirect};
use crate::secret::Secret;
use crate::security::{AuthenticationManager, CredentialTuple, SharedPrincipal};

/// Form login whose login page lives at an external identity provider.
///
/// Unauthenticated requests are redirected to the provider with a callback to
/// the local login page; the provider sends the user back with an
/// authorization `code`, which reaches the realm together with any form
/// credentials.
pub struct SingleSignOnAuthenticator {
    form: FormAuthenticator,
    identity_provider: IdentityProviderRedirect<FormLoginPage>,
}

impl SingleSignOnAuthenticator {
    pub const AUTH_TYPE: &'static str = "SingleSignOn";

    pub fn new(config: SharedLoginConfig, manager: Arc<dyn AuthenticationManager>) -> Self {
        Self {
            form: FormAuthenticator::with_auth_type(Self::AUTH_TYPE, config, manager),
            identity_provider: IdentityProviderRedirect::new(FormLoginPage),
        }
    }
}

impl FormFlow for SingleSignOnAuthenticator {
    fn form(&self) -> &FormAuthenticator {
        &self.form
    }

    fn on_credentials(&self, request: &dyn AuthRequest) -> Credentials {
        let authorization_code = request
            .parameter(form_keys::CODE, ParameterFilter::UnsafeRaw)
            .map(Secret::new);

        if authorization_code.is_some() {
            debug!("Found authorization code in request");
        }

        Credentials {
            authorization_code,
            ..form_credentials(request)
        }
    }

    fn credentials(&self, credentials: &Credentials) -> CredentialTuple {
        CredentialTuple::Triple {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            authorization_code: credentials.authorization_code.clone(),
        }
    }

    fn login_page(&self, request: &dyn AuthRequest) -> Result<String, Error> {
        let base = self.form.base();
        self.identity_provider
            .location(request, &base.config(), Some(base.manager().as_ref()))
    }
}

impl Authenticator for SingleSignOnAuthenticator {
    fn base(&self) -> &AuthenticatorBase {
        self.form.base()
    }

    fn base_mut(&mut self) -> &mut AuthenticatorBase {
        self.form.base_mut()
    }

    #[instrument(skip_all, fields(auth_type = Self::AUTH_TYPE))]
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
        self.form.login(username, password, request)
    }

    fn logout(&self, request: &mut dyn AuthRequest) {
        self.form.logout(request);
    }
}
