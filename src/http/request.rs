use std::collections::HashMap;

use hyper::http::request::Parts;
use tracing::warn;

use super::request_ext::HeaderExt;
use super::{AuthRequest, ParameterFilter, ServerVar};
use crate::security::SharedPrincipal;

/// How the request reached the server, as a front-end would report it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerVars {
    pub scheme: String,
    pub server_name: Option<String>,
    pub server_port: Option<u16>,
}

impl ServerVars {
    pub fn new(scheme: impl Into<String>, server_name: impl Into<String>, server_port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            server_name: Some(server_name.into()),
            server_port: Some(server_port),
        }
    }

    /// Derives the variables from the request target and `Host` header,
    /// falling back to the scheme's default port.
    pub fn from_parts(parts: &Parts) -> Self {
        let scheme = parts.uri.scheme_str().unwrap_or("http").to_string();

        let (server_name, port) = match parts.host() {
            Some((host, port)) => (Some(host), port),
            None => (None, None),
        };

        let server_port = port.or(match scheme.as_str() {
            "https" => Some(443),
            "http" => Some(80),
            _ => None,
        });

        Self {
            scheme,
            server_name,
            server_port,
        }
    }
}

/// An [`AuthRequest`] over the head of a `hyper` request.
///
/// Query parameters are always available; an `application/x-www-form-urlencoded`
/// body can be added with [`HyperRequest::with_form_body`] once the host has
/// collected it.
#[derive(Debug)]
pub struct HyperRequest {
    parts: Parts,
    server_vars: ServerVars,
    parameters: Vec<(String, String)>,
    base_modifier: Option<String>,
    user_principal: Option<SharedPrincipal>,
    auth_type: Option<String>,
    dispatched: bool,
    attributes: HashMap<String, String>,
}

fn parse_parameters(source: &str, encoded: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str(encoded).unwrap_or_else(|error| {
        warn!("Failed to parse {source} parameters: {error}");
        Vec::new()
    })
}

impl HyperRequest {
    pub fn new(parts: Parts) -> Self {
        let server_vars = ServerVars::from_parts(&parts);
        let parameters = parts
            .uri
            .query()
            .map(|query| parse_parameters("query", query))
            .unwrap_or_default();

        Self {
            parts,
            server_vars,
            parameters,
            base_modifier: None,
            user_principal: None,
            auth_type: None,
            dispatched: false,
            attributes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_server_vars(mut self, server_vars: ServerVars) -> Self {
        self.server_vars = server_vars;
        self
    }

    #[must_use]
    pub fn with_base_modifier(mut self, base_modifier: impl Into<String>) -> Self {
        self.base_modifier = Some(base_modifier.into());
        self
    }

    /// Adds the parameters of an urlencoded form body after those of the query string.
    #[must_use]
    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        match std::str::from_utf8(body) {
            Ok(body) => {
                let form = parse_parameters("form", body);
                self.parameters.extend(form);
            }
            Err(error) => warn!("Ignoring form body that is not valid UTF-8: {error}"),
        }
        self
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }
}

impl AuthRequest for HyperRequest {
    fn header(&self, name: &str) -> Option<String> {
        self.parts.get_header(name)
    }

    fn parameter(&self, name: &str, filter: ParameterFilter) -> Option<String> {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| filter.apply(value))
    }

    fn server_var(&self, var: ServerVar) -> Option<String> {
        match var {
            ServerVar::RequestScheme => Some(self.server_vars.scheme.clone()),
            ServerVar::ServerName => self.server_vars.server_name.clone(),
            ServerVar::ServerPort => self.server_vars.server_port.map(|port| port.to_string()),
        }
    }

    fn base_modifier(&self) -> Option<&str> {
        self.base_modifier.as_deref()
    }

    fn user_principal(&self) -> Option<SharedPrincipal> {
        self.user_principal.clone()
    }

    fn set_user_principal(&mut self, principal: Option<SharedPrincipal>) {
        self.user_principal = principal;
    }

    fn auth_type(&self) -> Option<&str> {
        self.auth_type.as_deref()
    }

    fn set_auth_type(&mut self, auth_type: Option<&str>) {
        self.auth_type = auth_type.map(ToString::to_string);
    }

    fn is_dispatched(&self) -> bool {
        self.dispatched
    }

    fn set_dispatched(&mut self, dispatched: bool) {
        self.dispatched = dispatched;
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn set_attribute(&mut self, key: &str, value: String) {
        self.attributes.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hyper::header::{AUTHORIZATION, HOST};
    use hyper::Request;

    use super::*;
    use crate::security::NamedPrincipal;

    fn build_request(uri: &str) -> HyperRequest {
        let request = Request::builder()
            .uri(uri)
            .header(AUTHORIZATION, "Bearer abc123")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();
        HyperRequest::new(parts)
    }

    #[test]
    fn test_header() {
        let request = build_request("/");
        assert_eq!(
            request.header("authorization"),
            Some("Bearer abc123".to_string())
        );
        assert!(request.has_header("Authorization"));
        assert!(!request.has_header("X-Missing"));
    }

    #[test]
    fn test_query_parameters() {
        let request = build_request("/login.jsp?code=4%2F0AX4&state=xyz&code=second");

        assert_eq!(
            request.parameter("code", ParameterFilter::UnsafeRaw),
            Some("4/0AX4".to_string())
        );
        assert_eq!(
            request.parameter("state", ParameterFilter::UnsafeRaw),
            Some("xyz".to_string())
        );
        assert!(!request.has_parameter("j_username"));
    }

    #[test]
    fn test_form_body_parameters() {
        let request = build_request("/j_security_check?source=query")
            .with_form_body(b"j_username=app%0Aserver&j_password=appserver.i0");

        assert_eq!(
            request.parameter("j_username", ParameterFilter::StripLow),
            Some("appserver".to_string())
        );
        assert_eq!(
            request.parameter("j_username", ParameterFilter::UnsafeRaw),
            Some("app\nserver".to_string())
        );
        assert_eq!(
            request.parameter("j_password", ParameterFilter::UnsafeRaw),
            Some("appserver.i0".to_string())
        );
        assert_eq!(
            request.parameter("source", ParameterFilter::UnsafeRaw),
            Some("query".to_string())
        );
    }

    #[test]
    fn test_invalid_form_body_is_ignored() {
        let request = build_request("/").with_form_body(&[0xFF, 0xFE]);
        assert!(!request.has_parameter("j_username"));
    }

    #[test]
    fn test_server_vars_from_absolute_uri() {
        let request = build_request("https://app.example/secure");

        assert_eq!(
            request.server_var(ServerVar::RequestScheme),
            Some("https".to_string())
        );
        assert_eq!(
            request.server_var(ServerVar::ServerName),
            Some("app.example".to_string())
        );
        assert_eq!(
            request.server_var(ServerVar::ServerPort),
            Some("443".to_string())
        );
    }

    #[test]
    fn test_server_vars_from_host_header() {
        let request = Request::builder()
            .uri("/secure")
            .header(HOST, "app.example:9080")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();
        let request = HyperRequest::new(parts);

        assert_eq!(
            request.server_var(ServerVar::RequestScheme),
            Some("http".to_string())
        );
        assert_eq!(
            request.server_var(ServerVar::ServerName),
            Some("app.example".to_string())
        );
        assert_eq!(
            request.server_var(ServerVar::ServerPort),
            Some("9080".to_string())
        );
    }

    #[test]
    fn test_explicit_server_vars() {
        let request =
            build_request("/secure").with_server_vars(ServerVars::new("https", "proxy.example", 9443));

        assert_eq!(
            request.server_var(ServerVar::RequestScheme),
            Some("https".to_string())
        );
        assert_eq!(
            request.server_var(ServerVar::ServerName),
            Some("proxy.example".to_string())
        );
        assert_eq!(
            request.server_var(ServerVar::ServerPort),
            Some("9443".to_string())
        );
    }

    #[test]
    fn test_state_mutators() {
        let mut request = build_request("/").with_base_modifier("/shop");

        assert_eq!(request.base_modifier(), Some("/shop"));
        assert!(request.user_principal().is_none());
        assert!(!request.is_dispatched());

        request.set_user_principal(Some(Arc::new(NamedPrincipal::new("appserver"))));
        request.set_auth_type(Some("Form"));
        request.set_dispatched(true);
        request.set_attribute("error_message", "boom".to_string());

        assert_eq!(request.user_principal().unwrap().name(), "appserver");
        assert_eq!(request.auth_type(), Some("Form"));
        assert!(request.is_dispatched());
        assert_eq!(request.attribute("error_message"), Some("boom"));
        assert_eq!(request.attributes().len(), 1);

        request.set_user_principal(None);
        request.set_auth_type(None);
        assert!(request.user_principal().is_none());
        assert!(request.auth_type().is_none());
    }
}
