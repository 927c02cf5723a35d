use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use gatherly::{db, service, PGPool};
use log::info;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    service::log::init_logger();
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|e| {
        panic!("Failed to get env with name 'DATABASE_URL': {:?}", e);
    });
    let pool: PGPool = db::init_db_pool(&db_url).await.unwrap_or_else(|e| {
        panic!("Failed to initialise database: {:?}", e);
    });
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    info!("listening on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(service::auth::SessionMiddleware {
                db_pool: pool.clone(),
            })
            .wrap(service::log::RequestLogger)
            .configure(gatherly::routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
