use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use prepmind_server::{
    app_state::AppState,
    config::Config,
    handlers::{configure_api, spa::configure_static},
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    config.log_startup_summary();

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let static_dir = config.static_dir.clone();

    let state = match AppState::new(config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to initialise application state: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("PrepMind server listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        let static_dir = static_dir.clone();
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(configure_api)
            .configure(move |cfg| configure_static(cfg, &static_dir))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
