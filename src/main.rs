use std::io;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use todo_list_api::{config::Config, db, routes};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = db::init(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let pool_data = web::Data::new(pool.clone());
    let auth_data = web::Data::new(config.auth.clone());

    log::info!("Starting Todo List API at {}", config.server_url());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(auth_data.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await;

    db::close(&pool).await;
    server
}
