use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Note;

/// A headline scraped from the source page.
///
/// Articles are created only by the scraper and are never removed from the
/// store. "Deleting" one from the saved view resets `saved` and purges its
/// notes instead.
///
/// `N` is the element type of the `notes` list: note ids for a plain
/// article, full [`Note`] records once populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article<N = Uuid> {
    pub id: Uuid,
    pub title: String,
    /// The `href` of the heading's anchor, if the heading had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub saved: bool,
    /// Notes attached to this article, in the order they were added.
    pub notes: Vec<N>,
    pub created_at: DateTime<Utc>,
}

/// An article whose `notes` references have been resolved.
pub type PopulatedArticle = Article<Note>;

impl Article {
    /// Swap the note ids for the records they name.
    ///
    /// Ids that do not resolve are dropped, keeping list order otherwise.
    pub fn populate(self, mut resolve: impl FnMut(&Uuid) -> Option<Note>) -> PopulatedArticle {
        let notes = self.notes.iter().filter_map(&mut resolve).collect();
        Article {
            id: self.id,
            title: self.title,
            link: self.link,
            saved: self.saved,
            notes,
            created_at: self.created_at,
        }
    }
}

/// Input for inserting a freshly scraped article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub link: Option<String>,
}

/// Equality filter for article listings. `None` matches every article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub saved: Option<bool>,
}

impl ArticleFilter {
    pub fn all() -> Self {
        Self { saved: None }
    }

    pub fn saved() -> Self {
        Self { saved: Some(true) }
    }

    pub fn unsaved() -> Self {
        Self { saved: Some(false) }
    }
}
