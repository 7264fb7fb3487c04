use backed_http::protocol::ResponseMessage;
use backed_web::router::{get, Router};
use backed_web::{handler_fn, HandlerError, RequestContext, Server};

fn hello_world(_request: &RequestContext<'_>, response: &mut ResponseMessage) -> Result<(), HandlerError> {
    response.add_header("Content-Type", "text/plain; charset=utf-8");
    response.write("hello world");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::builder().route("/hello", get("hello", handler_fn(hello_world)))?.build();

    Server::builder().router(router).address("127.0.0.1:3000").build()?.run_until_ctrl_c().await?;
    Ok(())
}
