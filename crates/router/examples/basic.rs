use std::error::Error;

use futures::FutureExt;
use http::{Method, StatusCode};
use micro_router::builtin::{BodyParser, Cors, RequestLogger};
use micro_router::{Dispatcher, Request, Response, Router, Settings, error_fn, middleware_fn, terminal_fn};
use serde_json::json;
use tracing::{Level, info};

fn api() -> Result<Router, Box<dyn Error + Send + Sync>> {
    let mut api = Router::new();

    let user = api.get(
        "/users/:id",
        [terminal_fn(|req, res| {
            let id = req.param("id").unwrap_or_default().to_string();
            async move { Ok(res.json(&json!({ "id": id, "name": "ann" }))?) }.boxed()
        })],
    )?;
    api.name(user, "user")?;

    api.post(
        "/users",
        [terminal_fn(|req, res| {
            let body = req.parsed_body().cloned().unwrap_or_default();
            async move { Ok(res.status(StatusCode::CREATED).json(&body)?) }.boxed()
        })],
    )?;

    Ok(api)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    micro_router::logging::init(Level::INFO)?;

    let mut router = Router::new();
    router.use_middleware([RequestLogger::middleware(), Cors::new().into_middleware(), BodyParser::middleware()])?;
    router.use_at(
        "/admin",
        [middleware_fn(|req, res, next| {
            if req.header("authorization").is_some() {
                return next.run(req, res);
            }
            next.fail("missing credentials", req, res)
        })],
    )?;
    router.mount(Some("/api"), api()?)?;
    router.use_middleware([error_fn(|err, req, res, next| {
        if err.is_fault() {
            return next.run(req, res);
        }
        async move { Ok(res.status(StatusCode::UNAUTHORIZED).text(err.to_string())?) }.boxed()
    })])?;

    let mut settings = Settings::default();
    settings.set("env", "development").set("baseUrl", "http://localhost:8080");
    let dispatcher = Dispatcher::builder().router(router).settings(settings).build()?;

    for (method, url, body) in [
        (Method::GET, "/api/users/42", ""),
        (Method::POST, "/api/users", r#"{"name":"bob"}"#),
        (Method::GET, "/admin", ""),
        (Method::GET, "/missing", ""),
    ] {
        let mut req = Request::new(method, url)
            .with_header(http::header::CONTENT_TYPE, http::HeaderValue::from_static("application/json"))
            .with_body(body.as_bytes().to_vec());
        let mut res = Response::new();
        dispatcher.handle(&mut req, &mut res).await?;
        info!(url, status = %res.status_code(), body = %String::from_utf8_lossy(res.body()), "dispatched");
    }

    let params = [("id", "42")].into_iter().collect();
    let url = dispatcher.url_to("user", &params, &micro_router::UrlOptions::new().absolute(true))?;
    info!(url = url.as_deref().unwrap_or("-"), "reverse routing");

    Ok(())
}
