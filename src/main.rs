use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

mod attendance;
mod auth;
mod config;
mod db;
mod error;
mod schemas;
mod students;

use crate::config::AppConfig;
use crate::db::Db;
use crate::error::ApiError;

// The store rejects bad documents with a 500, so body-shape failures caught
// earlier by serde keep the same contract instead of actix's default 400.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(5 * 1024 * 1024)
        .error_handler(|err, _req| ApiError::invalid("Invalid request payload", err).into())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "rollbook=debug,actix_web=info".to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env()?;
    let db = Db::connect(&config).await?;
    tracing::info!(database = %config.database, "connected to MongoDB");

    let bind_addr = config.bind_addr.clone();
    tracing::info!("listening on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(json_config())
            .wrap(Cors::permissive())
            .service(students::add_student)
            .service(students::list_students)
            // Literal segments must register ahead of the {id} matcher.
            .service(students::list_by_class)
            .service(students::list_fees)
            .service(students::update_fees)
            .service(students::list_class_ten)
            .service(attendance::record_attendance)
            .service(attendance::list_attendance)
            .service(students::get_student)
            .service(students::update_student)
            .service(students::delete_student)
    })
    .bind(bind_addr)?
    .run()
    .await?;
    Ok(())
}
