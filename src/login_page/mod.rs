mod single_sign_on;

pub use single_sign_on::{IdentityProviderRedirect, RedirectUri};

use crate::configuration::LoginConfig;
use crate::error::Error;
use crate::http::AuthRequest;

pub trait LoginPageResolver: Send + Sync {
    /// Location of the login page configured for `config`.
    fn login_page(&self, request: &dyn AuthRequest, config: &LoginConfig) -> Result<String, Error>;
}

/// Resolves the locally configured `form_login_page`, prefixed with the
/// request's base modifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormLoginPage;

impl LoginPageResolver for FormLoginPage {
    fn login_page(&self, request: &dyn AuthRequest, config: &LoginConfig) -> Result<String, Error> {
        let Some(form_login_page) = config.form_login_page() else {
            let msg = format!(
                "Please configure a form-login-page when using auth-method '{}' in the login-config",
                config.auth_method
            );
            return Err(Error::Configuration(msg));
        };

        match request.base_modifier() {
            Some(base_modifier) => Ok(format!("{base_modifier}{form_login_page}")),
            None => Ok(form_login_page.to_string()),
        }
    }
}
