use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::chain::Next;
use crate::error::HandlerResult;
use crate::middleware::{Middleware, StandardHandler};
use crate::request::Request;
use crate::response::Response;

/// Logs every request it sees and how the rest of the chain answered it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

impl RequestLogger {
    pub fn middleware() -> Middleware {
        Middleware::standard(RequestLogger)
    }
}

#[async_trait]
impl StandardHandler for RequestLogger {
    async fn call(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        let method = req.method().clone();
        let url = req.original_url().to_string();
        let start = Instant::now();
        info!(%method, %url, "request received");

        let result = next.run(req, res).await;

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(()) => info!(%method, %url, status = res.status_code().as_u16(), elapsed_ms, "request completed"),
            Err(e) => warn!(%method, %url, cause = %e, elapsed_ms, "request failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MiddlewareChain;
    use crate::middleware::terminal_fn;
    use futures::FutureExt;
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn test_passes_through() {
        let handler = terminal_fn(|_req, res| {
            async move {
                res.status(StatusCode::ACCEPTED).text("logged")?;
                Ok(())
            }
            .boxed()
        });
        let chain = MiddlewareChain::from(vec![RequestLogger::middleware(), handler]);
        let mut req = Request::new(Method::GET, "/log?x=1");
        let mut res = Response::new();

        chain.run(None, &mut req, &mut res, None).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
        assert_eq!(res.body().as_ref(), b"logged");
    }
}
