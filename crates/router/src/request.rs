//! Request handling module that provides access to HTTP request information and path parameters.
//!
//! This module contains the request side of the middleware contract:
//! - `Request`: the per-request state every middleware reads and mutates
//! - `PathParams`: named parameters extracted from the matched route schema

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::app::AppContext;

/// The request seen by every middleware of a chain.
///
/// Built once per incoming request by the transport adapter, then handed by mutable
/// reference through the chain.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    original_url: String,
    headers: HeaderMap,
    body: Bytes,
    parsed_body: Option<Value>,
    params: PathParams,
    data: Map<String, Value>,
    app: Option<Arc<AppContext>>,
}

impl Request {
    /// Creates a request from a method and the original url (path plus optional query).
    pub fn new(method: Method, original_url: impl Into<String>) -> Self {
        let original_url = original_url.into();
        let path = original_url.split('?').next().unwrap_or_default();
        let path = if path.is_empty() { "/".to_string() } else { path.to_string() };

        Self {
            method,
            path,
            original_url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            parsed_body: None,
            params: PathParams::empty(),
            data: Map::new(),
            app: None,
        }
    }

    /// Converts an already parsed `http::Request` into a routing request.
    pub fn from_http(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        let original_url = parts.uri.path_and_query().map_or_else(|| parts.uri.path().to_string(), ToString::to_string);

        let mut request = Self::new(parts.method, original_url);
        request.headers = parts.headers;
        request.body = body;
        request
    }

    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path part of the url, without query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the url as received, including the query string
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Returns the raw query string, if any
    pub fn query_string(&self) -> Option<&str> {
        self.original_url.split_once('?').map(|(_, query)| query)
    }

    /// Returns the first value of the query parameter `key`
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.query_string()?;
        serde_urlencoded::from_str::<Vec<(String, String)>>(query)
            .ok()?
            .into_iter()
            .find_map(|(name, value)| (name == key).then_some(value))
    }

    /// Deserializes the whole query string into `T`
    pub fn query_as<T>(&self) -> Result<T, serde_qs::Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_qs::from_str::<T>(self.query_string().unwrap_or_default())
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as string, if present and visible ASCII
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as decoded by a body parser middleware, if one ran
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    pub fn set_parsed_body(&mut self, value: Value) -> &mut Self {
        self.parsed_body = Some(value);
        self
    }

    /// Returns a reference to the path parameters extracted from the request URL
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Gets a single path parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn set_params(&mut self, params: PathParams) -> &mut Self {
        self.params = params;
        self
    }

    /// Gets a value stored by a previous middleware
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Stores a value for the following middlewares
    pub fn add_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// The application this request is dispatched by, once dispatch started
    pub fn app(&self) -> Option<&AppContext> {
        self.app.as_deref()
    }

    pub(crate) fn set_app(&mut self, app: Arc<AppContext>) {
        self.app = Some(app);
    }
}

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// Path parameters are named segments in the route schema. For example, in the schema
/// "/users/:id", "id" is a path parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: HashMap<String, String>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self { inner: HashMap::new() }
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Gets the value of a path parameter by its name
    /// Returns None if the parameter doesn't exist
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.inner.get(key.as_ref()).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { inner: iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect() }
    }
}
