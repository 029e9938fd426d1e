use axum::{
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Html,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::StoreError;
use crate::models::*;
use crate::scrape::Scraper;
use crate::views;

// ============================================================
// Error Handling
// ============================================================

/// JSON payload returned by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

/// Map a store error to a status code and JSON payload.
///
/// Not-found and invalid-id errors are reported verbatim. Anything else is
/// logged in full and reported to the client as a generic message.
fn store_error(e: StoreError) -> ApiError {
    let status = match &e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::InvalidId(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Internal error: {}", e);
        "Internal server error".to_string()
    } else {
        tracing::warn!("Request error: {}", e);
        e.to_string()
    };

    (
        status,
        Json(ErrorBody {
            error: e.code().to_string(),
            message,
        }),
    )
}

fn invalid_body(message: String) -> ApiError {
    tracing::warn!("Invalid note body: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: "invalid_body".to_string(),
            message,
        }),
    )
}

// ============================================================
// Pages
// ============================================================

pub async fn home(State(db): State<Database>) -> Result<Html<String>, ApiError> {
    let articles = db
        .list_articles(ArticleFilter::unsaved())
        .map_err(store_error)?;
    Ok(Html(views::render_home(&articles)))
}

pub async fn saved(State(db): State<Database>) -> Result<Html<String>, ApiError> {
    let articles = db
        .list_articles_populated(ArticleFilter::saved())
        .map_err(store_error)?;
    Ok(Html(views::render_saved(&articles)))
}

// ============================================================
// Scraping
// ============================================================

/// Kick off a scrape and acknowledge without waiting for it.
pub async fn scrape(State(db): State<Database>, State(scraper): State<Scraper>) -> &'static str {
    tracing::info!("Scrape requested for {}", scraper.source_url());
    let _ = scraper.spawn(db);
    "Scrape Complete"
}

// ============================================================
// Articles
// ============================================================

pub async fn list_articles(State(db): State<Database>) -> Result<Json<Vec<Article>>, ApiError> {
    db.list_articles(ArticleFilter::all())
        .map(Json)
        .map_err(store_error)
}

pub async fn get_article(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<PopulatedArticle>, ApiError> {
    db.get_article(&id)
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| store_error(StoreError::article_not_found(&id)))
}

pub async fn save_article(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    db.save_article(&id).map(Json).map_err(store_error)
}

/// Drop an article from the saved list and purge its notes.
pub async fn delete_article(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> Result<&'static str, ApiError> {
    let purged = db.unsave_article(&id).map_err(store_error)?;
    tracing::info!("Article {} removed from saved, {} notes purged", id, purged);
    Ok("Article Deleted")
}

// ============================================================
// Notes
// ============================================================

/// Note input taken from either a JSON or a urlencoded form body.
pub struct NoteBody(pub NoteInput);

impl<S> FromRequest<S> for NoteBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let input = if is_form {
            let Form(input) = Form::<NoteInput>::from_request(req, state)
                .await
                .map_err(|e| invalid_body(e.body_text()))?;
            input
        } else {
            let Json(input) = Json::<NoteInput>::from_request(req, state)
                .await
                .map_err(|e| invalid_body(e.body_text()))?;
            input
        };

        Ok(Self(input))
    }
}

pub async fn create_note(
    State(db): State<Database>,
    Path(article_id): Path<String>,
    NoteBody(input): NoteBody,
) -> Result<Json<Note>, ApiError> {
    db.add_note(&article_id, input.text)
        .map(Json)
        .map_err(store_error)
}

pub async fn delete_note(
    State(db): State<Database>,
    Path((note_id, article_id)): Path<(String, String)>,
) -> Result<&'static str, ApiError> {
    db.delete_note(&note_id, &article_id).map_err(store_error)?;
    Ok("Note Deleted")
}
