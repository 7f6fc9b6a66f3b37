mod base;
pub mod bearer;
pub mod form;
pub mod single_sign_on;

use uuid::Uuid;

pub use base::AuthenticatorBase;
pub use bearer::BearerAuthenticator;
pub use form::{FormAuthenticator, FormFlow};
pub use single_sign_on::SingleSignOnAuthenticator;

use crate::error::Error;
use crate::http::{AuthRequest, AuthResponse};
use crate::secret::Secret;
use crate::security::SharedPrincipal;

/// Credentials read from a single request.
///
/// Created at the start of every `authenticate` call and handed back with its
/// [`Authentication`]; authenticators never keep them.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub(crate) username: Option<String>,
    pub(crate) password: Option<Secret<String>>,
    pub(crate) authorization_code: Option<Secret<String>>,
}

impl Credentials {
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|secret| secret.expose().as_str())
    }

    pub fn authorization_code(&self) -> Option<&str> {
        self.authorization_code
            .as_ref()
            .map(|secret| secret.expose().as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.authorization_code.is_none()
    }
}

/// Outcome of [`Authenticator::authenticate`].
#[derive(Debug)]
pub struct Authentication {
    already_authenticated: bool,
    credentials: Credentials,
}

impl Authentication {
    pub(crate) fn challenged(credentials: Credentials) -> Self {
        Self {
            already_authenticated: false,
            credentials,
        }
    }

    /// `true` if authentication had already been completed upstream, `false`
    /// if a challenge/response cycle just ran on this request.
    pub fn already_authenticated(&self) -> bool {
        self.already_authenticated
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The username parsed from the request, if any.
    pub fn username(&self) -> Option<&str> {
        self.credentials.username()
    }
}

/// An HTTP authentication scheme.
///
/// Implementations are built once from configuration and shared between
/// requests; all per-request state flows through the arguments and the
/// returned [`Authentication`].
pub trait Authenticator: Send + Sync {
    fn base(&self) -> &AuthenticatorBase;

    fn base_mut(&mut self) -> &mut AuthenticatorBase;

    fn serial(&self) -> Uuid {
        self.base().serial()
    }

    fn auth_type(&self) -> &'static str {
        self.base().auth_type()
    }

    fn realm_name(&self) -> String {
        self.base().realm_name()
    }

    fn is_default_authenticator(&self) -> bool {
        self.base().is_default_authenticator()
    }

    fn set_default_authenticator(&mut self) {
        self.base_mut().set_default_authenticator();
    }

    /// Runs the challenge/verify/respond cycle for `request`.
    ///
    /// Missing credentials are not an error: they end in the scheme's
    /// challenge response.
    fn authenticate(
        &self,
        request: &mut dyn AuthRequest,
        response: &mut dyn AuthResponse,
    ) -> Authentication;

    /// Logs `username` in directly, without a challenge.
    fn login(
        &self,
        username: &str,
        password: &str,
        request: &mut dyn AuthRequest,
    ) -> Result<SharedPrincipal, Error>;

    fn logout(&self, request: &mut dyn AuthRequest);
}
