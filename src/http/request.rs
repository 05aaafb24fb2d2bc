//! The parsed, immutable HTTP request value.

use super::{Headers, Method, Params};

/// A fully parsed HTTP request.
///
/// Produced only by the wire parser ([`crate::http::parser::read_request`]);
/// by the time a `Request` crosses into the router it is fully validated:
/// the method is in the allowed set and the path starts with `/`. The value
/// is immutable after construction.
///
/// Query and body parameters are ordered and duplicate-preserving:
/// [`query_param`](Self::query_param) and [`body_param`](Self::body_param)
/// return every match in input order.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Params,
    headers: Headers,
    body: Params,
    multipart: bool,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        query: Params,
        headers: Headers,
        body: Params,
        multipart: bool,
    ) -> Self {
        Self {
            method,
            path,
            query,
            headers,
            body,
            multipart,
        }
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the request path (without the query string). Always starts with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns all query parameters in input order.
    pub fn query_params(&self) -> &Params {
        &self.query
    }

    /// Returns every query parameter value for `name`, in input order.
    pub fn query_param<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query.get_all(name)
    }

    /// Returns the request headers in wire order.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns all decoded body parameters.
    ///
    /// Empty unless the request was a non-GET with a form-urlencoded body.
    pub fn body_params(&self) -> &Params {
        &self.body
    }

    /// Returns every body parameter value for `name`, in input order.
    pub fn body_param<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.body.get_all(name)
    }

    /// Returns `true` if the request declared a `multipart/form-data` body.
    ///
    /// Multipart bodies are flagged but never decoded.
    pub fn is_multipart(&self) -> bool {
        self.multipart
    }
}
