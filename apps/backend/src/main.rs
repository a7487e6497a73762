use actix_web::{web, App, HttpServer};
use durak_backend::config::server::ServerConfig;
use durak_backend::middleware::cors::cors_middleware;
use durak_backend::routes;
use durak_backend::state::app_state::AppState;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "🚀 Starting Durak backend on http://{}:{}",
        config.host, config.port
    );

    let app_state = AppState::new(config.disconnect_grace);

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
