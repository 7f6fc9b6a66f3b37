//! Names used to look up configuration parameters, request parameters and
//! request attributes.

/// Keys of the authentication manager's named parameters.
pub mod param_keys {
    /// Base URL of the identity provider.
    pub const IDENTITY_URL: &str = "identityUrl";

    /// Authorization endpoint path; a template with one `%s` slot for the
    /// callback URL.
    pub const AUTHORIZATION_PATH: &str = "authorizationPath";

    /// Public port to advertise in callback URLs, overriding the port the
    /// request was received on.
    pub const SERVER_PORT: &str = "serverPort";
}

/// Request parameters read by the form based strategies.
pub mod form_keys {
    pub const USERNAME: &str = "j_username";
    pub const PASSWORD: &str = "j_password";
    pub const CODE: &str = "code";
}

/// Request attributes set by authenticators for the host pipeline.
pub mod request_keys {
    /// Message of an error surfaced instead of being propagated.
    pub const ERROR_MESSAGE: &str = "error_message";
}
