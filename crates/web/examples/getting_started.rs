use std::time::Duration;

use backed_http::protocol::{Cookie, ResponseMessage};
use backed_web::args::ParamType;
use backed_web::config::ServerConfig;
use backed_web::router::{get, post, Router};
use backed_web::{handler_fn, HandlerError, RequestContext, Server};
use http::StatusCode;

// curl -v http://127.0.0.1:8080/home
fn home(request: &RequestContext<'_>, response: &mut ResponseMessage) -> Result<(), HandlerError> {
    response.add_header("Content-Type", "text/html; charset=utf-8");
    response.write(format!("<h1>home</h1><p>you asked for {} {}</p>", request.method(), request.path()));
    Ok(())
}

// curl -v http://127.0.0.1:8080/test/cool
fn cool(_request: &RequestContext<'_>, response: &mut ResponseMessage) -> Result<(), HandlerError> {
    response.write("cool");
    Ok(())
}

// curl -v -d "name=hello&age=42" http://127.0.0.1:8080/test/user
fn save_user(request: &RequestContext<'_>, response: &mut ResponseMessage) -> Result<(), HandlerError> {
    let args = request.args();
    let Some(name) = args.get_str("name") else {
        response.set_status(StatusCode::BAD_REQUEST);
        response.write("name is required");
        return Ok(());
    };

    response.set_cookie(&Cookie::new("user", name).path("/").max_age(Duration::from_secs(3600)).http_only(true));
    response.write(format!("saved {name}, age {}", args.get_u64("age").map_or("unknown".to_string(), |age| age.to_string())));
    Ok(())
}

// curl -v "http://127.0.0.1:8080/test/search?q=rust+http"
fn search(request: &RequestContext<'_>, response: &mut ResponseMessage) -> Result<(), HandlerError> {
    let query = request.args().get_str("q").unwrap_or_default();
    response.write(format!("searching for {query:?}"));
    Ok(())
}

// curl -v http://127.0.0.1:8080/test/old
fn moved(_request: &RequestContext<'_>, response: &mut ResponseMessage) -> Result<(), HandlerError> {
    response.redirect("/test/cool", StatusCode::MOVED_PERMANENTLY)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::builder()
        .route("/home", get("home", handler_fn(home)))?
        .controller(
            "/test",
            [
                get("cool", handler_fn(cool)).at("/cool"),
                post("user", handler_fn(save_user)).at("/user").param("name", ParamType::String).param("age", ParamType::UInt),
                get("search", handler_fn(search)).at("/search").param("q", ParamType::String),
                get("old", handler_fn(moved)).at("/old"),
            ],
        )?
        .build();

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    Server::builder().config(config).api_version("1.0").router(router).build()?.run_until_ctrl_c().await?;
    Ok(())
}
