use std::net::TcpListener;

use actix_files::Files;
use actix_web::{dev::Server, middleware::Logger, web::Data, App, HttpServer};

use crate::{
    routes::{dashboard_route, health_route},
    services::{SearchService, SessionStore},
};

pub fn run(
    listener: TcpListener,
    search_service: Data<SearchService>,
    session_store: Data<SessionStore>,
) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(Files::new("/static", "./templates/static").prefer_utf8(true))
            .service(health_route::health_check)
            .service(dashboard_route::dashboard)
            .service(dashboard_route::search)
            .app_data(search_service.clone())
            .app_data(session_store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
