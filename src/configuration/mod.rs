use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Deserialize;
use tracing::info;

mod error;

use crate::authenticator::{
    Authenticator, BearerAuthenticator, FormAuthenticator, SingleSignOnAuthenticator,
};
use crate::security::AuthenticationManager;
pub use error::Error;

/// Login configuration shared between the host and its authenticators.
///
/// Authenticators only ever `load()` it, so a host storing a new value is seen
/// on the next request.
pub type SharedLoginConfig = Arc<ArcSwap<LoginConfig>>;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub manager: ManagerConfiguration,
    #[serde(default)]
    pub login: HashMap<String, LoginConfig>, // hashmap of resource set name <-> login config
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config_str = fs::read_to_string(path)?;
        Self::load_from_str(&config_str)
    }

    pub fn load_from_str(slice: &str) -> Result<Self, Error> {
        let config: Configuration = toml::from_str(slice)?;
        Ok(config)
    }

    /// Builds one authenticator per configured login, keyed by login name.
    pub fn build_authenticators(
        &self,
        manager: &Arc<dyn AuthenticationManager>,
    ) -> HashMap<String, Box<dyn Authenticator>> {
        let mut authenticators = HashMap::new();

        for (name, login_config) in &self.login {
            let auth_method = login_config.auth_method;
            let shared_config = Arc::new(ArcSwap::from_pointee(login_config.clone()));
            let authenticator = auth_method.to_authenticator(shared_config, manager.clone());

            info!("Configured '{auth_method}' authenticator for '{name}'");
            authenticators.insert(name.clone(), authenticator);
        }

        authenticators
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ManagerConfiguration {
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl ManagerConfiguration {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoginConfig {
    pub auth_method: AuthMethod,
    pub realm_name: String,
    #[serde(default)]
    pub default_authenticator: Option<bool>,
    #[serde(default)]
    pub form_login_config: Option<FormLoginConfig>,
}

impl LoginConfig {
    pub fn new(auth_method: AuthMethod, realm_name: impl Into<String>) -> Self {
        Self {
            auth_method,
            realm_name: realm_name.into(),
            default_authenticator: None,
            form_login_config: None,
        }
    }

    #[must_use]
    pub fn with_form_login_page(mut self, form_login_page: impl Into<String>) -> Self {
        let form_login_config = self.form_login_config.get_or_insert_with(Default::default);
        form_login_config.form_login_page = Some(form_login_page.into());
        self
    }

    #[must_use]
    pub fn with_form_error_page(mut self, form_error_page: impl Into<String>) -> Self {
        let form_login_config = self.form_login_config.get_or_insert_with(Default::default);
        form_login_config.form_error_page = Some(form_error_page.into());
        self
    }

    pub fn form_login_page(&self) -> Option<&str> {
        self.form_login_config
            .as_ref()
            .and_then(|form| form.form_login_page.as_deref())
            .filter(|page| !page.is_empty())
    }

    pub fn form_error_page(&self) -> Option<&str> {
        self.form_login_config
            .as_ref()
            .and_then(|form| form.form_error_page.as_deref())
            .filter(|page| !page.is_empty())
    }

    pub fn shared(self) -> SharedLoginConfig {
        Arc::new(ArcSwap::from_pointee(self))
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FormLoginConfig {
    pub form_login_page: Option<String>,
    pub form_error_page: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum AuthMethod {
    Bearer,
    Form,
    SingleSignOn,
}

impl AuthMethod {
    pub fn to_authenticator(
        self,
        config: SharedLoginConfig,
        manager: Arc<dyn AuthenticationManager>,
    ) -> Box<dyn Authenticator> {
        match self {
            AuthMethod::Bearer => Box::new(BearerAuthenticator::new(config, manager)),
            AuthMethod::Form => Box::new(FormAuthenticator::new(config, manager)),
            AuthMethod::SingleSignOn => Box::new(SingleSignOnAuthenticator::new(config, manager)),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AuthMethod::Bearer => BearerAuthenticator::AUTH_TYPE,
            AuthMethod::Form => FormAuthenticator::AUTH_TYPE,
            AuthMethod::SingleSignOn => SingleSignOnAuthenticator::AUTH_TYPE,
        };
        write!(f, "{name}")
    }
}

impl FromStr for AuthMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            BearerAuthenticator::AUTH_TYPE => Ok(AuthMethod::Bearer),
            FormAuthenticator::AUTH_TYPE => Ok(AuthMethod::Form),
            SingleSignOnAuthenticator::AUTH_TYPE => Ok(AuthMethod::SingleSignOn),
            _ => Err(Error::UnknownAuthMethod(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::security::MockAuthenticationManager;

    const CONFIG: &str = r#"
        [manager.params]
        identityUrl = "https://idp.example"
        authorizationPath = "/oauth/authorize?redirect=%s"

        [login.api]
        auth_method = "Bearer"
        realm_name = "api-realm"
        default_authenticator = true

        [login.web]
        auth_method = "SingleSignOn"
        realm_name = "my-test-realm"

        [login.web.form_login_config]
        form_login_page = "/login.jsp"
        form_error_page = "/error.jsp"
    "#;

    #[test]
    fn test_load_from_str() {
        let config = Configuration::load_from_str(CONFIG).unwrap();

        assert_eq!(
            config.manager.param("identityUrl"),
            Some("https://idp.example")
        );
        assert_eq!(
            config.manager.param("authorizationPath"),
            Some("/oauth/authorize?redirect=%s")
        );
        assert_eq!(config.manager.param("serverPort"), None);

        let api = &config.login["api"];
        assert_eq!(api.auth_method, AuthMethod::Bearer);
        assert_eq!(api.realm_name, "api-realm");
        assert_eq!(api.default_authenticator, Some(true));
        assert_eq!(api.form_login_page(), None);

        let web = &config.login["web"];
        assert_eq!(web.auth_method, AuthMethod::SingleSignOn);
        assert_eq!(web.default_authenticator, None);
        assert_eq!(web.form_login_page(), Some("/login.jsp"));
        assert_eq!(web.form_error_page(), Some("/error.jsp"));
    }

    #[test]
    fn test_load_empty() {
        let config = Configuration::load_from_str("").unwrap();
        assert!(config.manager.params.is_empty());
        assert!(config.login.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = Configuration::load(file.path()).unwrap();
        assert_eq!(config.login.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Configuration::load("/nonexistent/authenticator.toml");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_load_unknown_auth_method() {
        let toml = r#"
            [login.web]
            auth_method = "Digest"
            realm_name = "my-test-realm"
        "#;

        let result = Configuration::load_from_str(toml);
        assert!(matches!(result, Err(Error::ConfigurationFileFormat(_))));
    }

    #[test]
    fn test_load_missing_realm_name() {
        let toml = r#"
            [login.web]
            auth_method = "Form"
        "#;

        let result = Configuration::load_from_str(toml);
        assert!(matches!(result, Err(Error::ConfigurationFileFormat(_))));
    }

    #[test]
    fn test_empty_form_login_page_is_unset() {
        let config = LoginConfig::new(AuthMethod::Form, "realm").with_form_login_page("");
        assert_eq!(config.form_login_page(), None);
    }

    #[test]
    fn test_auth_method_from_str() {
        assert_eq!("Bearer".parse::<AuthMethod>().unwrap(), AuthMethod::Bearer);
        assert_eq!("Form".parse::<AuthMethod>().unwrap(), AuthMethod::Form);
        assert_eq!(
            "SingleSignOn".parse::<AuthMethod>().unwrap(),
            AuthMethod::SingleSignOn
        );

        let result = "bearer".parse::<AuthMethod>();
        assert!(matches!(result, Err(Error::UnknownAuthMethod(name)) if name == "bearer"));
    }

    #[test]
    fn test_auth_method_display() {
        assert_eq!(AuthMethod::Bearer.to_string(), "Bearer");
        assert_eq!(AuthMethod::Form.to_string(), "Form");
        assert_eq!(AuthMethod::SingleSignOn.to_string(), "SingleSignOn");
    }

    #[test]
    fn test_build_authenticators() {
        let config = Configuration::load_from_str(CONFIG).unwrap();
        let manager: Arc<dyn AuthenticationManager> = Arc::new(MockAuthenticationManager::new());

        let authenticators = config.build_authenticators(&manager);

        assert_eq!(authenticators.len(), 2);

        let api = &authenticators["api"];
        assert_eq!(api.auth_type(), "Bearer");
        assert_eq!(api.realm_name(), "api-realm");
        assert!(api.is_default_authenticator());

        let web = &authenticators["web"];
        assert_eq!(web.auth_type(), "SingleSignOn");
        assert_eq!(web.realm_name(), "my-test-realm");
        assert!(!web.is_default_authenticator());
    }
}
