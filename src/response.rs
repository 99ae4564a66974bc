//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! You should not need to think about this module directly. Build a
//! [`Response`] in your handler and return it. That is the entire job
//! description.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use http::StatusCode;
/// use moor::Response;
///
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
pub struct Response {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Bytes,
}

impl Response {
    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some("text/plain; charset=utf-8"),
            body: Bytes::from(body.into()),
        }
    }

    /// Response with no body.
    pub fn status(status: StatusCode) -> Self {
        Self { status, content_type: None, body: Bytes::new() }
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        if let Some(ct) = self.content_type {
            builder = builder.header(http::header::CONTENT_TYPE, ct);
        }
        // Infallible: status and header are typed values, not parsed strings.
        builder
            .body(Full::new(self.body))
            .expect("response head is statically valid")
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implemented for the return types a handler plausibly produces, so plain
/// strings and bare status codes work without ceremony:
///
/// ```rust
/// use moor::Request;
///
/// async fn version(_req: Request) -> &'static str {
///     "0.1.0"
/// }
/// ```
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

/// Return a [`StatusCode`] directly from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        Response::status(self)
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[tokio::test]
    async fn text_sets_body_and_content_type() {
        let res = Response::text("hello").into_inner();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }

    #[test]
    fn status_codes_convert_to_empty_responses() {
        let res = StatusCode::NO_CONTENT.into_response().into_inner();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(res.headers().get(http::header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn strings_convert_to_text_responses() {
        let res = String::from("ready").into_response().into_inner();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
