use crate::error::{Error, Result};
use std::fmt;
use url::Url;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8000";

/// The externally advertised base URL of the server, plus the host/port it binds to.
///
/// The advertised form is kept exactly as it was supplied: responses that embed absolute URLs
/// concatenate it with the request path verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrl {
    advertised: String,
    host: String,
    port: u16,
}

impl ServerUrl {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("`{}`: {}", raw, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("`{}` has no host", raw)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::InvalidUrl(format!("`{}` has no port", raw)))?;

        // `host_str` keeps the brackets around IPv6 literals, socket parsing does not want them.
        let host = host.trim_start_matches('[').trim_end_matches(']').to_string();

        Ok(Self {
            advertised: raw.to_string(),
            host,
            port,
        })
    }

    /// The base URL as configured at startup, e.g. `http://127.0.0.1:8000`.
    pub fn as_str(&self) -> &str {
        &self.advertised
    }

    /// The `(host, port)` pair to bind the listener to.
    pub fn bind_address(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    /// Absolute URL for `path`, which is appended untouched (query string included).
    pub fn join_raw(&self, path: &str) -> String {
        format!("{}{}", self.advertised, path)
    }
}

impl Default for ServerUrl {
    fn default() -> Self {
        Self {
            advertised: DEFAULT_URL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.advertised)
    }
}

/// The organization, project, app and release the fake API pretends to host.
///
/// They are baked into the route patterns once, when the route table is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiScope {
    pub org: String,
    pub project: String,
    pub app: String,
    pub version: String,
}

impl ApiScope {
    /// `<app>@<version>`, the way release identifiers appear in paths.
    pub fn release(&self) -> String {
        format!("{}@{}", self.app, self.version)
    }
}

impl Default for ApiScope {
    fn default() -> Self {
        Self {
            org: "org".to_string(),
            project: "project".to_string(),
            app: "app".to_string(),
            version: "1.1.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_binds_to_localhost_8000() {
        let url = ServerUrl::parse(DEFAULT_URL).unwrap();
        assert_eq!(url, ServerUrl::default());
        assert_eq!(url.bind_address(), ("127.0.0.1", 8000));
    }

    #[test]
    fn advertised_url_is_kept_verbatim() {
        let url = ServerUrl::parse("http://example.test:9090").unwrap();
        assert_eq!(url.as_str(), "http://example.test:9090");
        assert_eq!(
            url.join_raw("/api/0/?foo=bar"),
            "http://example.test:9090/api/0/?foo=bar"
        );
    }

    #[test]
    fn port_falls_back_to_the_scheme_default() {
        let url = ServerUrl::parse("http://localhost").unwrap();
        assert_eq!(url.bind_address(), ("localhost", 80));
    }

    #[test]
    fn ipv6_hosts_lose_their_brackets_for_binding() {
        let url = ServerUrl::parse("http://[::1]:8000").unwrap();
        assert_eq!(url.bind_address(), ("::1", 8000));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            ServerUrl::parse("not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            ServerUrl::parse("unix:/tmp/socket"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn release_joins_app_and_version() {
        assert_eq!(ApiScope::default().release(), "app@1.1.0");
    }
}
