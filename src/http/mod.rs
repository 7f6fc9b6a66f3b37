//! Request and response interfaces the authenticators work against, plus a
//! `hyper` backed implementation of both.

mod request;
mod request_ext;
mod response;

use hyper::header::{HeaderName, HeaderValue};
use hyper::StatusCode;

pub use request::{HyperRequest, ServerVars};
pub use request_ext::HeaderExt;
pub use response::HyperResponse;

use crate::security::SharedPrincipal;

/// Server-level variables describing how the request reached us.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServerVar {
    RequestScheme,
    ServerName,
    ServerPort,
}

/// Filtering applied to a request parameter before it is handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterFilter {
    /// The value exactly as sent by the client.
    UnsafeRaw,
    /// ASCII control characters removed.
    StripLow,
}

impl ParameterFilter {
    pub fn apply(self, value: &str) -> String {
        match self {
            ParameterFilter::UnsafeRaw => value.to_string(),
            ParameterFilter::StripLow => value.chars().filter(|c| !c.is_ascii_control()).collect(),
        }
    }
}

pub trait AuthRequest {
    fn header(&self, name: &str) -> Option<String>;

    fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    fn parameter(&self, name: &str, filter: ParameterFilter) -> Option<String>;

    fn has_parameter(&self, name: &str) -> bool {
        self.parameter(name, ParameterFilter::UnsafeRaw).is_some()
    }

    fn server_var(&self, var: ServerVar) -> Option<String>;

    /// Path prefix of a rewritten (virtual host) location, if any.
    fn base_modifier(&self) -> Option<&str>;

    fn user_principal(&self) -> Option<SharedPrincipal>;

    fn set_user_principal(&mut self, principal: Option<SharedPrincipal>);

    fn auth_type(&self) -> Option<&str>;

    fn set_auth_type(&mut self, auth_type: Option<&str>);

    fn is_dispatched(&self) -> bool;

    fn set_dispatched(&mut self, dispatched: bool);

    fn attribute(&self, key: &str) -> Option<&str>;

    fn set_attribute(&mut self, key: &str, value: String);
}

pub trait AuthResponse {
    fn status_code(&self) -> StatusCode;

    fn set_status_code(&mut self, status: StatusCode);

    /// Replaces all values of `name`.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    fn add_header(&mut self, name: HeaderName, value: HeaderValue);

    fn append_body(&mut self, data: &[u8]);
}
