mod config;
mod handlers;
mod response;
mod store;
mod types;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use config::{AppState, ServerConfig};
use handlers::{health, high_score, register_player, root, submit_score};
use store::PlayerStore;

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .route("/players", web::post().to(register_player))
        .route("/high-score/{player_name}", web::get().to(high_score))
        .route("/submit-score", web::post().to(submit_score));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let players = PlayerStore::open(&config.data_dir).map_err(std::io::Error::other)?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        json_limit_bytes = config.json_limit_bytes,
        max_player_name_len = config.max_player_name_len,
        "starting hurdle racer score api"
    );

    let state = AppState {
        players: Arc::new(players),
        max_player_name_len: config.max_player_name_len,
    };
    let json_limit = config.json_limit_bytes;

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().limit(json_limit))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
