//! Incoming HTTP request type.

use http::request::Parts;

/// An incoming HTTP request.
///
/// moor hands handlers the request head only — method, path, headers. Bodies
/// are not buffered: a handler that needs one belongs in a framework, not in
/// a lifecycle shim.
pub struct Request {
    parts: Parts,
}

impl Request {
    pub(crate) fn new(parts: Parts) -> Self {
        Self { parts }
    }

    pub fn method(&self) -> &http::Method {
        &self.parts.method
    }

    /// The request path, leading `/` included.
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Case-insensitive header lookup. Returns `None` for headers whose value
    /// is not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
