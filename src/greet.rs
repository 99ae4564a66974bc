//! Built-in greeting handler.
//!
//! The default handler moor ships with: it echoes the request path back to
//! the caller. Useful as a smoke-test endpoint and as the canonical example
//! of the handler contract.
//!
//! ```rust,no_run
//! use moor::{greet, Server};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() {
//! Server::bind("0.0.0.0:18080")
//!     .serve(greet, CancellationToken::new())
//!     .await
//!     .unwrap();
//! # }
//! ```

use crate::{Request, Response};

/// Echoes the request path: `GET /world` → `200 OK`, body `Hello, world!`.
///
/// The leading `/` is stripped, nothing else is touched — `GET /a/b` greets
/// `a/b`, and `GET /` greets the empty string. Always succeeds; the method
/// is not inspected.
pub async fn greet(req: Request) -> Response {
    let name = req.path().strip_prefix('/').unwrap_or(req.path());
    Response::text(format!("Hello, {name}!"))
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use http_body_util::BodyExt;

    use super::*;

    fn request(path: &str) -> Request {
        let (parts, ()) = http::Request::builder()
            .uri(path)
            .body(())
            .unwrap()
            .into_parts();
        Request::new(parts)
    }

    async fn body_of(res: Response) -> String {
        let bytes = res
            .into_inner()
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn greets_the_path_segment() {
        let res = greet(request("/world")).await;
        assert_eq!(body_of(res).await, "Hello, world!");
    }

    #[tokio::test]
    async fn greets_nested_paths_verbatim() {
        let res = greet(request("/a/b")).await;
        assert_eq!(body_of(res).await, "Hello, a/b!");
    }

    #[tokio::test]
    async fn greets_the_empty_segment() {
        let res = greet(request("/")).await;
        assert_eq!(body_of(res).await, "Hello, !");
    }

    #[tokio::test]
    async fn always_succeeds() {
        let res = greet(request("/anything")).await;
        assert_eq!(res.into_inner().status(), StatusCode::OK);
    }
}
