use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::info;

use animal_classifier::{routes, telemetry, AppState, LabelSet, OnnxClassifier, ServerConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = ServerConfig::from_env()?;
    let labels = match &config.labels_path {
        Some(path) => LabelSet::from_file(path)?,
        None => LabelSet::default(),
    };

    info!(path = %config.model_path.display(), "loading model");
    let classifier = OnnxClassifier::load(&config.model_path)?;
    info!(labels = ?labels.to_vec(), "model ready");

    let state = web::Data::new(AppState::new(classifier, labels, config.max_upload_bytes));

    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    info!("Server running at http://{}:{}", config.host, config.port);
    server.bind(config.bind_addr())?.run().await?;
    Ok(())
}
