pub mod completion;
pub mod db;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod rejections;
pub mod services;
pub mod views;

use axum::{routing::get, Router};

use crate::completion::OpenAiClient;
use crate::services::generation::GenerationService;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub generation: GenerationService,
}

impl AppState {
    pub fn new(db: db::Db, client: OpenAiClient) -> Self {
        Self {
            generation: GenerationService::new(db.clone(), client),
            db,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(names::HEALTH_URL, get(|| async { "ok" }))
        .merge(handlers::course::routes())
        .merge(handlers::lesson::routes())
        .merge(handlers::question::routes())
        .merge(handlers::answer::routes())
        .merge(handlers::generate::routes())
        .with_state(state)
}
