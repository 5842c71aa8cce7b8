/*!
 * Backend for the neighbourhood engagement site: local news, the transit poll, resident
 * suggestions and complaints, image uploads and a directions lookup.
 *
 * Everything is held in memory for the life of the process.
 */
use std::path::PathBuf;
use std::sync::Arc;

use tide::security::CorsMiddleware;
use tide::utils::After;

pub mod api_models;
pub mod config;
pub mod directions;
pub mod error;
pub mod models;
pub mod news;
pub mod routes;
pub mod store;
pub mod tally;
pub mod uploads;

use config::Config;
use directions::DirectionsProxy;
use error::ConfigError;
use models::{Complaint, Suggestion};
use store::Store;
use tally::VoteTally;
use uploads::UploadDir;

/**
 * Struct for carrying application state into tide request handlers
 *
 * Each store is owned here and nowhere else, a fresh `AppState` is a fresh site.
 */
#[derive(Clone)]
pub struct AppState {
    pub tally: Arc<VoteTally>,
    pub suggestions: Arc<Store<Suggestion>>,
    pub complaints: Arc<Store<Complaint>>,
    pub uploads: Arc<UploadDir>,
    pub directions: Arc<DirectionsProxy>,
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            tally: Arc::new(VoteTally::new()),
            suggestions: Arc::new(Store::new()),
            complaints: Arc::new(Store::new()),
            uploads: Arc::new(UploadDir::new(
                config.upload_dir.clone(),
                config.max_upload_bytes,
            )),
            directions: Arc::new(DirectionsProxy::from_config(config)?),
            static_dir: Arc::new(config.static_dir.clone()),
        })
    }
}

/**
 * Build the tide app with every route mounted
 *
 * Creates the upload directory if it is missing, since it is served back out under `/uploads`.
 */
pub async fn app(state: AppState) -> std::io::Result<tide::Server<AppState>> {
    state.uploads.ensure_exists().await?;
    let upload_dir = state.uploads.path().to_path_buf();

    let mut app = tide::with_state(state);
    app.with(CorsMiddleware::new());
    app.with(After(error::render_errors));

    app.at("/api/news").get(routes::news::list);
    app.at("/api/trending").get(routes::news::trending);
    app.at("/api/poll").get(routes::poll::show);
    app.at("/api/vote").post(routes::poll::vote);
    app.at("/api/suggestions")
        .get(routes::suggestions::list)
        .post(routes::suggestions::create);
    app.at("/api/suggestions/:id/vote").post(routes::suggestions::vote);
    app.at("/api/complaints")
        .get(routes::complaints::list)
        .post(routes::complaints::create);
    app.at("/api/complaints/:id/vote").post(routes::complaints::vote);
    app.at("/api/upload").post(routes::uploads::create);
    app.at("/api/directions").get(routes::directions::show);

    app.at("/uploads").serve_dir(upload_dir)?;
    app.at("/").get(routes::ui::index);
    app.at("*").get(routes::ui::index);

    Ok(app)
}
