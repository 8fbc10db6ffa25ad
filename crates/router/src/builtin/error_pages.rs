use async_trait::async_trait;
use http::StatusCode;
use tracing::debug;

use crate::chain::Next;
use crate::error::{HandlerResult, RouteError};
use crate::middleware::{ErrorHandler, Middleware, StandardHandler};
use crate::request::Request;
use crate::response::Response;

/// Answers 404 with an html page. Does nothing if the response was already sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl NotFound {
    pub fn middleware() -> Middleware {
        Middleware::standard(NotFound)
    }
}

#[async_trait]
impl StandardHandler for NotFound {
    async fn call(&self, req: &mut Request, res: &mut Response, _next: Next<'_>) -> HandlerResult {
        if res.is_sent() {
            return Ok(());
        }

        let message = format!("Cannot {} {}", req.method(), escape_html(req.path()));
        res.status(StatusCode::NOT_FOUND).html(page(StatusCode::NOT_FOUND, "Page not found", &message))?;
        Ok(())
    }
}

/// Answers 500 with an html page.
///
/// The error message is only shown when the application runs in `development` or `test`,
/// or with `debug` enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnhandledError;

impl UnhandledError {
    pub fn middleware() -> Middleware {
        Middleware::error(UnhandledError)
    }
}

#[async_trait]
impl ErrorHandler for UnhandledError {
    async fn call(&self, err: RouteError, req: &mut Request, res: &mut Response, _next: Next<'_>) -> HandlerResult {
        if res.is_sent() {
            debug!(cause = %err, "response already sent, error page skipped");
            return Ok(());
        }

        let exposes_errors = req.app().is_some_and(|app| app.settings().exposes_errors());
        let cause = if exposes_errors { escape_html(&err.to_string()) } else { "50X - Fatal Error".to_string() };
        let message = format!("Cannot {} {}<br><strong>{}</strong>", req.method(), escape_html(req.path()), cause);

        res.status(StatusCode::INTERNAL_SERVER_ERROR)
            .html(page(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", &message))?;
        Ok(())
    }
}

fn page(status: StatusCode, title: &str, message: &str) -> String {
    let code = status.as_u16();
    format!(
        "<!doctype html><html><head><title>{code} - {title}</title><meta charset=\"UTF-8\">\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\"></head>\
         <body><main><p>{code}</p><h1>{title}</h1><div>{message}</div></main></body></html>"
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppContext;
    use crate::chain::MiddlewareChain;
    use crate::config::Settings;
    use http::Method;
    use std::sync::Arc;

    fn body(res: &Response) -> String {
        String::from_utf8_lossy(res.body()).to_string()
    }

    #[tokio::test]
    async fn test_not_found_page() {
        let chain = MiddlewareChain::from(vec![NotFound::middleware()]);
        let mut req = Request::new(Method::DELETE, "/missing?x=<b>");
        let mut res = Response::new();

        chain.run(None, &mut req, &mut res, None).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert!(body(&res).contains("Cannot DELETE /missing"));
        assert_eq!(res.get("content-type"), Some("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_not_found_keeps_sent_response() {
        let chain = MiddlewareChain::from(vec![NotFound::middleware()]);
        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::new();
        res.text("done").unwrap();

        chain.run(None, &mut req, &mut res, None).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(body(&res), "done");
    }

    #[tokio::test]
    async fn test_unhandled_error_hides_details_in_production() {
        let chain = MiddlewareChain::from(vec![UnhandledError::middleware()]);
        let mut req = Request::new(Method::GET, "/boom");
        req.set_app(Arc::new(AppContext::default()));
        let mut res = Response::new();

        chain.run(Some(RouteError::fault("db password is hunter2")), &mut req, &mut res, None).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body(&res).contains("hunter2"));
        assert!(body(&res).contains("50X - Fatal Error"));
    }

    #[tokio::test]
    async fn test_unhandled_error_shows_details_in_development() {
        let mut settings = Settings::default();
        settings.set("env", "development");

        let chain = MiddlewareChain::from(vec![UnhandledError::middleware()]);
        let mut req = Request::new(Method::GET, "/boom");
        req.set_app(Arc::new(AppContext::new(settings, None, Default::default())));
        let mut res = Response::new();

        chain.run(Some(RouteError::fault("<db> unreachable")), &mut req, &mut res, None).await.unwrap();
        assert!(body(&res).contains("&lt;db&gt; unreachable"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
    }
}
