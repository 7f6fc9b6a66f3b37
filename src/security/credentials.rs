use crate::secret::Secret;

/// Credentials handed to a realm, in the order the realm expects them.
///
/// Entries that could not be read from the request are `None`; the shape of
/// the tuple never changes for a given authenticator.
#[derive(Clone, Debug)]
pub enum CredentialTuple {
    Pair {
        username: Option<String>,
        password: Option<Secret<String>>,
    },
    Triple {
        username: Option<String>,
        password: Option<Secret<String>>,
        authorization_code: Option<Secret<String>>,
    },
}

impl CredentialTuple {
    pub fn arity(&self) -> usize {
        match self {
            CredentialTuple::Pair { .. } => 2,
            CredentialTuple::Triple { .. } => 3,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            CredentialTuple::Pair { username, .. } | CredentialTuple::Triple { username, .. } => {
                username.as_deref()
            }
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            CredentialTuple::Pair { password, .. } | CredentialTuple::Triple { password, .. } => {
                password.as_ref().map(|secret| secret.expose().as_str())
            }
        }
    }

    pub fn authorization_code(&self) -> Option<&str> {
        match self {
            CredentialTuple::Pair { .. } => None,
            CredentialTuple::Triple {
                authorization_code, ..
            } => authorization_code
                .as_ref()
                .map(|secret| secret.expose().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_accessors() {
        let tuple = CredentialTuple::Pair {
            username: Some("appserver".to_string()),
            password: Some(Secret::from("appserver.i0")),
        };

        assert_eq!(tuple.arity(), 2);
        assert_eq!(tuple.username(), Some("appserver"));
        assert_eq!(tuple.password(), Some("appserver.i0"));
        assert_eq!(tuple.authorization_code(), None);
    }

    #[test]
    fn test_triple_accessors_with_missing_entries() {
        let tuple = CredentialTuple::Triple {
            username: None,
            password: None,
            authorization_code: Some(Secret::from("4/0AX4")),
        };

        assert_eq!(tuple.arity(), 3);
        assert_eq!(tuple.username(), None);
        assert_eq!(tuple.password(), None);
        assert_eq!(tuple.authorization_code(), Some("4/0AX4"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let tuple = CredentialTuple::Pair {
            username: Some("appserver".to_string()),
            password: Some(Secret::from("appserver.i0")),
        };

        let debug_output = format!("{tuple:?}");
        assert!(debug_output.contains("appserver"));
        assert!(!debug_output.contains("appserver.i0"));
    }
}
