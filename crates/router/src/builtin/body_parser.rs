use async_trait::async_trait;
use mime::Mime;
use serde_json::{Map, Value};
use tracing::trace;

use crate::chain::Next;
use crate::error::{BoxError, HandlerResult};
use crate::middleware::{Middleware, StandardHandler};
use crate::request::Request;
use crate::response::Response;

/// Decodes the request body into [`Request::parsed_body`].
///
/// - `application/json` is parsed as json, a malformed document fails the request
/// - `application/x-www-form-urlencoded` becomes an object of strings, a body which cannot be
///   decoded fails the request
/// - any other content type is kept as a string
///
/// Requests without content type or with an empty body are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyParser;

impl BodyParser {
    pub fn middleware() -> Middleware {
        Middleware::standard(BodyParser)
    }
}

#[async_trait]
impl StandardHandler for BodyParser {
    async fn call(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        if let Some(parsed) = parse_body(req)? {
            req.set_parsed_body(parsed);
        }
        next.run(req, res).await
    }
}

fn parse_body(req: &Request) -> Result<Option<Value>, BoxError> {
    let Some(content_type) = req.header(http::header::CONTENT_TYPE.as_str()) else {
        return Ok(None);
    };
    if req.body().is_empty() {
        return Ok(None);
    }

    trace!(content_type, "parsing request body");

    let parsed = match content_type.parse::<Mime>() {
        Ok(mime) if is(&mime, mime::JSON) => serde_json::from_slice::<Value>(req.body())?,
        Ok(mime) if is(&mime, mime::WWW_FORM_URLENCODED) => {
            let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(req.body())?;
            Value::Object(pairs.into_iter().map(|(key, value)| (key, Value::String(value))).collect::<Map<_, _>>())
        }
        _ => Value::String(String::from_utf8_lossy(req.body()).into_owned()),
    };
    Ok(Some(parsed))
}

fn is(mime: &Mime, subtype: mime::Name<'_>) -> bool {
    mime.type_() == mime::APPLICATION && mime.subtype() == subtype
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MiddlewareChain;
    use bytes::Bytes;
    use http::header::{CONTENT_TYPE, HeaderValue};
    use http::Method;
    use serde_json::json;

    fn request(content_type: Option<&'static str>, body: &'static str) -> Request {
        let req = Request::new(Method::POST, "/").with_body(Bytes::from_static(body.as_bytes()));
        match content_type {
            Some(content_type) => req.with_header(CONTENT_TYPE, HeaderValue::from_static(content_type)),
            None => req,
        }
    }

    async fn parse(mut req: Request) -> (Request, HandlerResult) {
        let chain = MiddlewareChain::from(vec![BodyParser::middleware()]);
        let mut res = Response::new();
        let result = chain.run(None, &mut req, &mut res, None).await.map_err(Into::into);
        (req, result)
    }

    #[tokio::test]
    async fn test_json_body() {
        let (req, result) = parse(request(Some("application/json; charset=utf-8"), r#"{"name":"ann"}"#)).await;
        assert!(result.is_ok());
        assert_eq!(req.parsed_body(), Some(&json!({"name": "ann"})));
    }

    #[tokio::test]
    async fn test_form_body() {
        let (req, result) = parse(request(Some("application/x-www-form-urlencoded"), "name=ann&city=Porto%20Novo")).await;
        assert!(result.is_ok());
        assert_eq!(req.parsed_body(), Some(&json!({"name": "ann", "city": "Porto Novo"})));
    }

    #[tokio::test]
    async fn test_other_body_is_kept_as_text() {
        let (req, _) = parse(request(Some("text/plain"), "hello")).await;
        assert_eq!(req.parsed_body(), Some(&json!("hello")));
    }

    #[tokio::test]
    async fn test_without_content_type() {
        let (req, result) = parse(request(None, "hello")).await;
        assert!(result.is_ok());
        assert_eq!(req.parsed_body(), None);
    }

    #[tokio::test]
    async fn test_malformed_json_fails() {
        let (req, result) = parse(request(Some("application/json"), "{oops")).await;
        assert!(result.is_err());
        assert_eq!(req.parsed_body(), None);
    }

    #[test]
    fn test_parse_errors_are_returned() {
        let req = request(Some("application/x-www-form-urlencoded"), "name=ann&tags=a&tags=b");
        assert_eq!(parse_body(&req).unwrap(), Some(json!({"name": "ann", "tags": "b"})));

        let req = request(Some("application/json"), "name=ann");
        let err = parse_body(&req).unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }
}
