use async_trait::async_trait;
use http::HeaderValue;
use http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};

use crate::chain::Next;
use crate::error::{HandlerResult, ResponseError};
use crate::middleware::{Middleware, StandardHandler};
use crate::request::Request;
use crate::response::Response;

const DEFAULT_ORIGIN: &str = "*";
const DEFAULT_HEADERS: &str = "X-Requested-With, Content-Type, Accept, Origin, Authorization";
const DEFAULT_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";

/// Adds the cross-origin resource sharing headers, then continues.
#[derive(Debug, Clone)]
pub struct Cors {
    origin: HeaderValue,
    headers: HeaderValue,
    methods: HeaderValue,
}

impl Default for Cors {
    fn default() -> Self {
        Self {
            origin: HeaderValue::from_static(DEFAULT_ORIGIN),
            headers: HeaderValue::from_static(DEFAULT_HEADERS),
            methods: HeaderValue::from_static(DEFAULT_METHODS),
        }
    }
}

impl Cors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: &str) -> Result<Self, ResponseError> {
        self.origin = HeaderValue::from_str(origin).map_err(ResponseError::invalid_header)?;
        Ok(self)
    }

    pub fn with_headers(mut self, headers: &str) -> Result<Self, ResponseError> {
        self.headers = HeaderValue::from_str(headers).map_err(ResponseError::invalid_header)?;
        Ok(self)
    }

    pub fn with_methods(mut self, methods: &str) -> Result<Self, ResponseError> {
        self.methods = HeaderValue::from_str(methods).map_err(ResponseError::invalid_header)?;
        Ok(self)
    }

    pub fn into_middleware(self) -> Middleware {
        Middleware::standard(self)
    }
}

#[async_trait]
impl StandardHandler for Cors {
    async fn call(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        res.header(ACCESS_CONTROL_ALLOW_ORIGIN, self.origin.clone())
            .header(ACCESS_CONTROL_ALLOW_HEADERS, self.headers.clone())
            .header(ACCESS_CONTROL_ALLOW_METHODS, self.methods.clone());
        next.run(req, res).await
    }
}
