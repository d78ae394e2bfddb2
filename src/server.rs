use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Instant;

use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server};

#[macro_use]
mod error;
mod api;
mod context;
mod cors;
mod database;
mod date_format;
mod interviews;
mod logger;
mod media;

use crate::api::{Event, Reply};
use crate::database::Postgres;
use crate::error::AppError;

async fn router(req: Request<Body>, db: Postgres) -> Result<Response<Body>, AppError> {
    let path = req.uri().path().to_string();
    let upload_dir = Path::new(media::UPLOAD_DIR);

    match path.as_str() {
        "/api/interviews" => {
            let event = Event::from_request(req).await?;
            interviews::handle(&db, event).await.into_response()
        }
        "/api/upload-image" => {
            let event = Event::from_request(req).await?;
            media::handle(upload_dir, event).await.into_response()
        }
        _ => match path.strip_prefix("/uploads/") {
            Some(filename) if req.method() == Method::GET => media::serve(upload_dir, filename).await,
            _ => Err(AppError::NotFound("Route")),
        },
    }
}

async fn handler(req: Request<Body>, db: Postgres) -> Result<Response<Body>, Infallible> {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = match router(req, db).await {
        Ok(response) => response,
        Err(e) => Reply::from_error(&e)
            .into_response()
            .unwrap_or_else(|_| Response::new(Body::empty())),
    };
    log::info!(
        "{} {} {} {}ms",
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();
    let config = context::Config::from_env()?;
    logger::setup_logger(config.debug, config.log_file.as_deref())?;
    if config.database_url.is_none() {
        log::warn!("DATABASE_URL is not set, interview requests will fail");
    }
    let db = Postgres::new(config.database_url.as_deref())?;

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let make_svc = make_service_fn(move |_: &AddrStream| {
        let db = db.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handler(req, db.clone()))) }
    });

    let server = Server::bind(&addr).serve(make_svc);
    log::info!("listening on http://{}", addr);

    if let Err(e) = server.await {
        log::error!("server error: {}", e);
    }
    Ok(())
}
