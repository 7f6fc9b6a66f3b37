use std::fmt;

use hyper::header::InvalidHeaderValue;
use hyper::StatusCode;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    // deployment misconfiguration, never a user error
    Configuration(String),
    // programmatic login rejected by the realm
    Authentication(String),
    InvalidRedirect(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Configuration(err) | Error::Authentication(err) => write!(f, "{err}"),
            Error::InvalidRedirect(err) => write!(f, "Invalid redirect: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<InvalidHeaderValue> for Error {
    fn from(error: InvalidHeaderValue) -> Self {
        Error::InvalidRedirect(format!("{error}"))
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::InvalidRedirect(format!("{error}"))
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::Configuration(_) | Error::InvalidRedirect(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::Configuration("Missing form-login-page".to_string());
        assert_eq!(format!("{error}"), "Missing form-login-page");

        let error = Error::Authentication("Can't authenticate user bob".to_string());
        assert_eq!(format!("{error}"), "Can't authenticate user bob");

        let error = Error::InvalidRedirect("bad host".to_string());
        assert_eq!(format!("{error}"), "Invalid redirect: bad host");
    }

    #[test]
    fn test_status_code() {
        assert_eq!(
            Error::Configuration(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Authentication(String::new()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::InvalidRedirect(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_invalid_header_value() {
        let header_error = hyper::header::HeaderValue::from_str("bad\nvalue").unwrap_err();
        let error = Error::from(header_error);
        assert!(matches!(error, Error::InvalidRedirect(_)));
    }

    #[test]
    fn test_from_url_parse_error() {
        let parse_error = url::Url::parse("https://app example").unwrap_err();
        let error = Error::from(parse_error);
        assert!(matches!(error, Error::InvalidRedirect(_)));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
