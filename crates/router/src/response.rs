//! The response side of the middleware contract.
//!
//! A [`Response`] collects a status, headers and a body. Content writers (`json`, `html`,
//! `text`, `send`, `render`, `end`) finish the response: a later write fails with
//! [`ResponseError::AlreadySent`].

use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use mime::Mime;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::app::AppContext;
use crate::config::VIEW_ENGINE_OPTIONS;
use crate::error::{RenderError, ResponseError};

const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");
const POWERED_BY: &str = "micro-router";

#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    sent: bool,
    locals: Map<String, Value>,
    app: Option<Arc<AppContext>>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            sent: false,
            locals: Map::new(),
            app: None,
        }
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets a header from strings.
    pub fn set(&mut self, name: &str, value: &str) -> Result<&mut Self, ResponseError> {
        let name = HeaderName::try_from(name).map_err(ResponseError::invalid_header)?;
        let value = HeaderValue::try_from(value).map_err(ResponseError::invalid_header)?;
        Ok(self.header(name, value))
    }

    /// Returns a header value, if present and visible ASCII.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[inline]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// variables exposed to the views rendered by this response
    pub fn locals(&self) -> &Map<String, Value> {
        &self.locals
    }

    pub fn add_local(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.locals.insert(key.into(), value.into());
        self
    }

    /// Sends `content` as pretty printed json.
    pub fn json<T: Serialize + ?Sized>(&mut self, content: &T) -> Result<(), ResponseError> {
        let body = serde_json::to_vec_pretty(content)?;
        self.finish(Some(mime::APPLICATION_JSON), body)
    }

    pub fn html(&mut self, content: impl Into<String>) -> Result<(), ResponseError> {
        self.finish(Some(mime::TEXT_HTML_UTF_8), content.into())
    }

    pub fn text(&mut self, content: impl Into<String>) -> Result<(), ResponseError> {
        self.finish(Some(mime::TEXT_PLAIN_UTF_8), content.into())
    }

    /// Sends raw bytes, keeping the content type set so far.
    pub fn send(&mut self, body: impl Into<Bytes>) -> Result<(), ResponseError> {
        self.finish(None, body)
    }

    /// Ends the response with the body written so far.
    pub fn end(&mut self) -> Result<(), ResponseError> {
        let body = self.body.clone();
        self.finish(None, body)
    }

    /// Renders a view with the application's view engine and sends it as html.
    ///
    /// The response locals are available to the view, `locals` take precedence.
    pub fn render(&mut self, view: &str, locals: Value) -> Result<(), ResponseError> {
        if self.sent {
            return Err(ResponseError::AlreadySent);
        }
        let app = self.app.clone().ok_or(RenderError::NoEngine)?;

        let mut merged = self.locals.clone();
        match locals {
            Value::Object(locals) => merged.extend(locals),
            Value::Null => {}
            other => {
                merged.insert("value".to_string(), other);
            }
        }

        let options = app.settings().get(VIEW_ENGINE_OPTIONS).cloned().unwrap_or(Value::Null);
        let html = app.render(view, Value::Object(merged), &options)?;
        self.html(html)
    }

    fn finish(&mut self, content_type: Option<Mime>, body: impl Into<Bytes>) -> Result<(), ResponseError> {
        if self.sent {
            return Err(ResponseError::AlreadySent);
        }

        if let Some(content_type) = content_type {
            let value = HeaderValue::from_str(content_type.as_ref()).map_err(ResponseError::invalid_header)?;
            self.headers.insert(CONTENT_TYPE, value);
        }
        self.body = body.into();
        self.sent = true;
        Ok(())
    }

    pub(crate) fn set_app(&mut self, app: Arc<AppContext>) {
        self.app = Some(app);
    }

    /// Converts into an `http::Response` for the transport.
    pub fn into_http(self) -> http::Response<Bytes> {
        let powered_by = self.app.as_ref().is_some_and(|app| app.settings().x_powered_by());

        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if powered_by {
            response.headers_mut().insert(X_POWERED_BY, HeaderValue::from_static(POWERED_BY));
        }
        response
    }
}
