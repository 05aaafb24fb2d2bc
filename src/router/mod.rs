//! Request routing: map exact `(method, path)` pairs to handler functions.
//!
//! Lookup is byte-exact. There is no prefix, wildcard, or pattern matching,
//! and trailing slashes are significant: `/users` and `/users/` are different
//! routes. Registration happens once at startup, before the server starts
//! accepting; the table is read-only while serving, so concurrent lookups need
//! no locking beyond the shared reference.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::AsyncWrite;

use crate::http::{Method, Request, Responder};

/// The type-erased output sink a handler writes through.
pub type ResponseSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Type-erased, heap-allocated async handler.
///
/// A handler receives the parsed [`Request`] and a [`Responder`] wrapping the
/// client socket, and must write exactly one response through it before
/// returning. Handlers are stored behind `Arc<dyn Fn(..)>` so they can be
/// shared across connection tasks without copying the underlying closure. In
/// practice you never construct this type directly; use
/// [`Router::register`] or the [`Router::get`]/[`Router::post`] helpers.
pub type Handler = Arc<
    dyn Fn(
            Request,
            Responder<ResponseSink>,
        ) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>
        + Send
        + Sync
        + 'static,
>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Request, Responder<ResponseSink>) -> impl Future<Output = io::Result<()>> + Send`
/// that is also `Send + Sync + 'static` implements this trait automatically via
/// the blanket impl below, so registration call sites never spell out the
/// boxed-future type.
pub trait IntoHandler: Send + Sync + 'static {
    /// Call the handler, boxing the returned future.
    fn call(
        &self,
        request: Request,
        responder: Responder<ResponseSink>,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Request, Responder<ResponseSink>) -> F + Send + Sync + 'static,
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    fn call(
        &self,
        request: Request,
        responder: Responder<ResponseSink>,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>> {
        Box::pin((self)(request, responder))
    }
}

/// Exact-match routing table.
///
/// # Examples
///
/// ```
/// use servlite::{Request, Responder, ResponseSink, Router, http::{Method, StatusCode}};
///
/// let mut router = Router::new();
/// router.post("/messages", |_req: Request, mut responder: Responder<ResponseSink>| async move {
///     responder.send_status(StatusCode::Created).await
/// });
///
/// assert!(router.lookup(Method::Post, "/messages").is_some());
/// assert!(router.lookup(Method::Get, "/messages").is_none());
/// ```
pub struct Router {
    routes: HashMap<(Method, String), Handler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty routing table.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Registers `handler` under the exact `(method, path)` key.
    ///
    /// Registering the same key twice replaces the earlier handler. Call this
    /// only during startup, before the server begins accepting.
    pub fn register(&mut self, method: Method, path: impl Into<String>, handler: impl IntoHandler) {
        let handler: Handler = Arc::new(move |req, responder| handler.call(req, responder));
        self.routes.insert((method, path.into()), handler);
    }

    /// Registers a handler for `GET` requests on exactly `path`.
    pub fn get(&mut self, path: impl Into<String>, handler: impl IntoHandler) {
        self.register(Method::Get, path, handler);
    }

    /// Registers a handler for `POST` requests on exactly `path`.
    pub fn post(&mut self, path: impl Into<String>, handler: impl IntoHandler) {
        self.register(Method::Post, path, handler);
    }

    /// Returns the handler registered for exactly `(method, path)`, or `None`.
    ///
    /// The returned handler is a cheap `Arc` clone.
    pub fn lookup(&self, method: Method, path: &str) -> Option<Handler> {
        self.routes.get(&(method, path.to_owned())).cloned()
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    fn noop_router() -> Router {
        let mut router = Router::new();
        router.get("/hello", |_req, mut responder: Responder<ResponseSink>| {
            async move { responder.send_status(StatusCode::Ok).await }
        });
        router.post("/messages", |_req, mut responder: Responder<ResponseSink>| {
            async move { responder.send_status(StatusCode::Created).await }
        });
        router
    }

    #[test]
    fn starts_empty() {
        let router = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn lookup_hit() {
        let router = noop_router();
        assert!(router.lookup(Method::Get, "/hello").is_some());
        assert!(router.lookup(Method::Post, "/messages").is_some());
    }

    #[test]
    fn lookup_requires_method_match() {
        let router = noop_router();
        assert!(router.lookup(Method::Post, "/hello").is_none());
        assert!(router.lookup(Method::Get, "/messages").is_none());
    }

    #[test]
    fn lookup_is_byte_exact() {
        let router = noop_router();
        assert!(router.lookup(Method::Get, "/hello/").is_none());
        assert!(router.lookup(Method::Get, "/Hello").is_none());
        assert!(router.lookup(Method::Get, "/hell").is_none());
    }

    #[test]
    fn reregistration_replaces() {
        let mut router = noop_router();
        let before = router.len();
        router.get("/hello", |_req, mut responder: Responder<ResponseSink>| {
            async move { responder.send_status(StatusCode::Accepted).await }
        });
        assert_eq!(router.len(), before);
    }
}
