use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod calendar;
mod config;
mod db;
mod docs;
mod engine;
mod error;
mod model;
mod notifier;
mod routes;
mod scanner;
mod store;
mod tracker;
mod utils;

use config::Config;
use db::init_db;

use crate::api::AppEngine;
use crate::calendar::WorkCalendarPolicy;
use crate::docs::ApiDoc;
use crate::engine::{Engine, EngineSettings};
use crate::store::mysql::{
    MySqlAttendanceStore, MySqlEmployeeDirectory, MySqlEscalationStateStore,
    MySqlNotificationOutbox,
};
use crate::utils::directory_cache;
use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance engine up"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let engine: Data<AppEngine> = Data::new(Engine::new(
        MySqlAttendanceStore::new(pool.clone()),
        MySqlEscalationStateStore::new(pool.clone()),
        MySqlEmployeeDirectory::new(pool.clone()),
        MySqlNotificationOutbox::new(pool.clone()),
        WorkCalendarPolicy::new(config.work_calendar_mode),
        EngineSettings {
            lookback_window_days: config.lookback_window_days.max(1),
            consecutive_absence_threshold: config.consecutive_absence_threshold.max(1),
            scan_concurrency: config.scan_concurrency.max(1),
        },
    ));

    let pool_for_warmup = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = directory_cache::warmup_directory_cache(&pool_for_warmup).await {
            warn!(error = %e, "Failed to warm up directory cache");
        }
    });

    // Low-frequency sweep over every department; submissions also trigger
    // their own department's scan synchronously.
    let engine_for_timer = engine.clone();
    let scan_interval = config.scan_interval_secs.max(60);
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(Duration::from_secs(scan_interval));
        // The first tick completes immediately; skip it so startup does not
        // race the directory warmup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let today = Utc::now().date_naive();
            info!(%today, "Periodic scan sweep starting");
            if let Err(e) = engine_for_timer.run_all_departments(today).await {
                warn!(error = %e, "Periodic scan sweep failed");
            }
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(engine.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
