use actix_web::dev::Service;
use actix_web::{App, HttpServer, web};
use log::info;
use std::io;

use rickbot::api;
use rickbot::app_state::AppState;
use rickbot::config::AppConfig;
use rickbot::logging;
use rickbot::service::request_context::tag_remote_addr;

fn startup_error<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let mut config = AppConfig::load().map_err(startup_error)?;
    config.apply_args(std::env::args().skip(1));
    logging::init(&config.logging).map_err(startup_error)?;

    let app_state = AppState::from_config(config.clone()).map_err(startup_error)?;
    let data = web::Data::new(app_state);

    info!("Starting server on {}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            // outermost, so the access log line also carries the caller
            .wrap_fn(|req, srv| {
                tag_remote_addr(&req);
                srv.call(req)
            })
            .app_data(data.clone())
            .configure(api::configure)
            .default_service(web::to(api::not_found))
    })
    .workers(config.server.workers.max(1))
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
