use hyper::header::{AsHeaderName, HOST};
use hyper::http::request::Parts;

pub trait HeaderExt {
    fn get_header<K: AsHeaderName>(&self, header: K) -> Option<String>;
    fn host(&self) -> Option<(String, Option<u16>)>;
}

impl HeaderExt for Parts {
    fn get_header<K>(&self, header: K) -> Option<String>
    where
        K: AsHeaderName,
    {
        self.headers
            .get(header)
            .and_then(|header| header.to_str().ok())
            .map(ToString::to_string)
    }

    /// Host and port the client addressed, from the request target or the `Host` header.
    fn host(&self) -> Option<(String, Option<u16>)> {
        if let Some(host) = self.uri.host() {
            return Some((host.to_string(), self.uri.port_u16()));
        }

        let host = self.get_header(HOST)?;
        let authority = host.parse::<hyper::http::uri::Authority>().ok()?;
        Some((authority.host().to_string(), authority.port_u16()))
    }
}
