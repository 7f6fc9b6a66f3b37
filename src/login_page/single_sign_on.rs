use tracing::debug;
use url::Url;

use super::{FormLoginPage, LoginPageResolver};
use crate::configuration::LoginConfig;
use crate::error::Error;
use crate::http::{AuthRequest, ServerVar};
use crate::keys::param_keys;
use crate::security::AuthenticationManager;

// implicit ports of http and https, never advertised in a callback URL
const DEFAULT_PORTS: [u16; 2] = [80, 443];

/// Callback URL pointing back at this server, built from typed parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectUri {
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
}

impl RedirectUri {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port: port.filter(|port| !DEFAULT_PORTS.contains(port)),
            path: "/".to_string(),
        }
    }

    /// Origin of `request` as seen by the client; `port` overrides the port
    /// the request arrived on.
    pub fn from_request(request: &dyn AuthRequest, port: Option<u16>) -> Result<Self, Error> {
        let scheme = request
            .server_var(ServerVar::RequestScheme)
            .unwrap_or_else(|| "http".to_string());

        let Some(host) = request.server_var(ServerVar::ServerName) else {
            let msg = "Can't build the redirect URI without a server name".to_string();
            return Err(Error::Configuration(msg));
        };

        let port = port.or_else(|| {
            request
                .server_var(ServerVar::ServerPort)
                .and_then(|port| port.parse::<u16>().ok())
        });

        Ok(Self::new(scheme, host, port))
    }

    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The callback as an absolute URL.
    ///
    /// Path and query are percent-encoded where needed; existing `%XX`
    /// escapes are kept as they are.
    pub fn to_url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}://{}", self.scheme, self.host))?;

        if url.set_port(self.port).is_err() {
            let msg = format!("Can't set port on '{}://{}'", self.scheme, self.host);
            return Err(Error::InvalidRedirect(msg));
        }

        match self.path.split_once('?') {
            Some((path, query)) => {
                url.set_path(path);
                url.set_query(Some(query));
            }
            None => url.set_path(&self.path),
        }

        Ok(url)
    }
}

/// Builds the identity provider location a single sign-on login page
/// redirects to.
///
/// The manager parameters `identityUrl` and `authorizationPath` are joined into
/// a template whose first `%s` receives the callback URL: this server's origin
/// followed by the local login page of the wrapped resolver.
#[derive(Clone, Debug, Default)]
pub struct IdentityProviderRedirect<R = FormLoginPage> {
    login_page: R,
}

impl<R: LoginPageResolver> IdentityProviderRedirect<R> {
    pub fn new(login_page: R) -> Self {
        Self { login_page }
    }

    pub fn location(
        &self,
        request: &dyn AuthRequest,
        config: &LoginConfig,
        manager: Option<&dyn AuthenticationManager>,
    ) -> Result<String, Error> {
        let Some(manager) = manager else {
            let msg = "Can't find mandatory authentication manager instance".to_string();
            return Err(Error::Configuration(msg));
        };

        let params = manager.manager_configuration();

        // missing parameters leave a partial template rather than failing
        let identity_url = params.param(param_keys::IDENTITY_URL).unwrap_or_default();
        let authorization_path = params
            .param(param_keys::AUTHORIZATION_PATH)
            .unwrap_or_default();
        let template = format!("{identity_url}{authorization_path}");

        let server_port = params
            .param(param_keys::SERVER_PORT)
            .and_then(|port| port.parse::<u16>().ok());

        let login_page = self.login_page.login_page(request, config)?;
        let callback = RedirectUri::from_request(request, server_port)?
            .with_path(&login_page)
            .to_url()?;

        debug!("Redirecting to identity provider with callback {callback}");
        Ok(substitute_callback(&template, callback.as_str()))
    }
}

fn substitute_callback(template: &str, callback: &str) -> String {
    template.replacen("%s", callback, 1)
}
