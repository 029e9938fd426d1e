use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-written annotation on one article.
///
/// `article` names the owning [`Article`](super::Article) but does not own
/// it; the article's `notes` list is the authoritative ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub body: String,
    pub article: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a note. Accepted as JSON or as a urlencoded form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteInput {
    pub text: String,
}
