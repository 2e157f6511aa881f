use actix_cors::Cors;
use actix_web::{middleware, App, HttpServer};

use whiteboard_server::config::ServerConfig;
use whiteboard_server::handlers;
use whiteboard_server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = ServerConfig::from_env()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;

    let srv_tx = spawn_server();

    log::info!("Relay listening on {}", config.bind_address());
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .data(srv_tx.clone())
            .configure(handlers::root)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
