use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use hyper::body::Bytes;

pub const JSON: &str = "application/json";
pub const TEXT: &str = "text/plain";

/// Status code answered by the liveness check. It is not a real HTTP status: clients only
/// look for this exact number.
pub const ALIVE_STATUS: u16 = 999;

/// A fully materialised response: status, content type and body.
///
/// `Content-Length` is never set by hand: it is derived from the body when the response is
/// converted for the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    mime: &'static str,
    body: String,
}

impl Response {
    /// A response with the given status and an empty `text/plain` body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            mime: TEXT,
            body: String::new(),
        }
    }

    /// `200 OK` with a JSON body, passed through as-is.
    pub fn json(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK).set_body_raw(body, JSON)
    }

    /// The sentinel answer to the liveness check.
    pub fn alive() -> Self {
        // hyper accepts any code in 100..=999.
        let status = StatusCode::from_u16(ALIVE_STATUS).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status)
    }

    pub fn set_body_string(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.mime = TEXT;
        self
    }

    pub fn set_body_raw(mut self, body: impl Into<String>, mime: &'static str) -> Self {
        self.body = body.into();
        self.mime = mime;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub(crate) fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let length = self.body.len();
        let mut response = hyper::Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.mime));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_length_counts_utf8_bytes() {
        let response = Response::json(r#"{"name":"ünïcödé"}"#).into_hyper();

        let expected = r#"{"name":"ünïcödé"}"#.len().to_string();
        assert_eq!(response.headers()[CONTENT_LENGTH], expected.as_str());
        assert_eq!(response.headers()[CONTENT_TYPE], JSON);
    }

    #[test]
    fn empty_bodies_advertise_zero_length() {
        let response = Response::new(StatusCode::OK).into_hyper();
        assert_eq!(response.headers()[CONTENT_LENGTH], "0");
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT);
    }

    #[test]
    fn the_liveness_sentinel_survives_conversion() {
        let response = Response::alive().into_hyper();
        assert_eq!(response.status().as_u16(), 999);
    }
}
