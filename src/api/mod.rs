mod handlers;

use std::path::Path;

use axum::{
    extract::FromRef,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::db::Database;
use crate::scrape::Scraper;

pub use handlers::{ErrorBody, NoteBody};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub scraper: Scraper,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Scraper {
    fn from_ref(state: &AppState) -> Self {
        state.scraper.clone()
    }
}

pub fn create_router(db: Database, scraper: Scraper) -> Router {
    build_router(AppState { db, scraper }, None)
}

/// Like [`create_router`], serving files from `public_dir` for unrouted paths.
pub fn create_router_with_assets(
    db: Database,
    scraper: Scraper,
    public_dir: impl AsRef<Path>,
) -> Router {
    build_router(AppState { db, scraper }, Some(public_dir.as_ref()))
}

fn build_router(state: AppState, public_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        // Pages
        .route("/", get(handlers::home))
        .route("/saved", get(handlers::saved))
        .route("/scrape", get(handlers::scrape))
        // Articles
        .route("/articles", get(handlers::list_articles))
        .route("/articles/{id}", get(handlers::get_article))
        .route("/articles/save/{id}", post(handlers::save_article))
        .route("/articles/delete/{id}", post(handlers::delete_article))
        // Notes
        .route("/notes/save/{id}", post(handlers::create_note))
        .route(
            "/notes/delete/{note_id}/{article_id}",
            delete(handlers::delete_note),
        );

    if let Some(dir) = public_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
