//! Interfaces of the external collaborators: realms, principals and the
//! authentication manager that resolves realms by name.

mod credentials;

use std::fmt;
use std::sync::Arc;

pub use credentials::CredentialTuple;

use crate::configuration::ManagerConfiguration;

/// Opaque handle of an authenticated identity produced by a realm.
pub trait Principal: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;
}

pub type SharedPrincipal = Arc<dyn Principal>;

/// A principal that carries nothing but its name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedPrincipal {
    name: String,
}

impl NamedPrincipal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Principal for NamedPrincipal {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Verifies a credentials tuple.
///
/// The tuple shape depends on the authenticator: `Pair` for bearer, form and
/// programmatic logins, `Triple` for single sign-on. `None` means the
/// credentials were rejected.
#[cfg_attr(test, mockall::automock)]
pub trait Realm: Send + Sync {
    fn authenticate(&self, credentials: &CredentialTuple) -> Option<SharedPrincipal>;
}

#[cfg_attr(test, mockall::automock)]
pub trait AuthenticationManager: Send + Sync {
    fn realm(&self, name: &str) -> Option<Arc<dyn Realm>>;

    fn manager_configuration(&self) -> &ManagerConfiguration;
}
