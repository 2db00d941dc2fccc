use std::fmt::{self, Write as _};

use http::{Method, Version};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// An incoming request to the stub server.
///
/// The dispatcher gets an immutable reference to a `Request` instance: the body is drained
/// from the connection exactly once, when the request arrives, and stored here.
///
/// ### Implementation notes:
/// The transport body stream cannot be read twice. Building the whole request up-front lets
/// every route, generator and the request log share the same view of it without any mutable
/// per-connection state.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// The request target as received: path plus query string, if any.
    pub path: String,
    pub version: Version,
    pub body: Vec<u8>,
}

/// The request body as the request log shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyText {
    Utf8(String),
    /// Lowercase hexadecimal rendering of a body that is not valid UTF-8.
    Hex(String),
}

impl BodyText {
    pub fn as_str(&self) -> &str {
        match self {
            BodyText::Utf8(s) | BodyText::Hex(s) => s,
        }
    }
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            version: Version::HTTP_11,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The path with leading and trailing `/` removed, the form routes are compared in.
    pub fn normalized_path(&self) -> &str {
        normalize_path(&self.path)
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn body_text(&self) -> BodyText {
        match std::str::from_utf8(&self.body) {
            Ok(text) => BodyText::Utf8(text.to_string()),
            Err(_) => {
                let mut hex = String::with_capacity(self.body.len() * 2);
                for byte in &self.body {
                    // Writing into a `String` cannot fail.
                    let _ = write!(hex, "{:02x}", byte);
                }
                BodyText::Hex(hex)
            }
        }
    }

    pub(crate) async fn from_hyper(
        request: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Request, hyper::Error> {
        let (parts, body) = request.into_parts();
        let path = match parts.uri.path_and_query() {
            Some(path_and_query) => path_and_query.as_str().to_string(),
            None => parts.uri.path().to_string(),
        };

        let body = body.collect().await?.to_bytes();

        Ok(Self {
            method: parts.method,
            path,
            version: parts.version,
            body: body.to_vec(),
        })
    }
}

impl fmt::Display for Request {
    /// The request line, e.g. `POST /api/0/envelope HTTP/1.1`, followed by the body size when
    /// there is a body.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.method, self.path, self.version)?;
        if !self.body.is_empty() {
            write!(f, " ({} bytes)", self.body.len())?;
        }
        Ok(())
    }
}

pub(crate) fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slashes_are_trimmed_on_both_sides() {
        assert_eq!(normalize_path("/api/0/"), "api/0");
        assert_eq!(normalize_path("api/0"), "api/0");
        assert_eq!(normalize_path("//STOP//"), "STOP");
        assert_eq!(normalize_path("/"), "");
    }

    #[test]
    fn query_strings_are_part_of_the_normalized_path() {
        let request = Request::new(Method::GET, "/api/0/organizations/org/repos/?cursor=");
        assert_eq!(
            request.normalized_path(),
            "api/0/organizations/org/repos/?cursor="
        );
    }

    #[test]
    fn utf8_bodies_are_kept_as_text() {
        let request = Request::new(Method::POST, "/").with_body("héllo");
        assert_eq!(request.body_text(), BodyText::Utf8("héllo".to_string()));
    }

    #[test]
    fn binary_bodies_are_rendered_as_hex() {
        let request = Request::new(Method::POST, "/").with_body(vec![0xffu8, 0x00, 0x1a]);
        assert_eq!(request.body_text(), BodyText::Hex("ff001a".to_string()));
    }

    #[test]
    fn display_shows_the_request_line_and_body_size() {
        let request = Request::new(Method::GET, "/api/0/");
        assert_eq!(request.to_string(), "GET /api/0/ HTTP/1.1");

        let request = Request::new(Method::POST, "/api/0/envelope").with_body("{}");
        assert_eq!(request.to_string(), "POST /api/0/envelope HTTP/1.1 (2 bytes)");
    }
}
