//! Domain models for Newsroom.
//!
//! - [`Article`]: a scraped headline. Starts unsaved; the user can save it,
//!   annotate it, and later drop it from the saved view.
//! - [`Note`]: free-text annotation attached to one article.
//!
//! An article's `notes` field holds note ids. [`PopulatedArticle`] is the
//! same article with those ids resolved into full notes.

mod article;
mod note;

pub use article::*;
pub use note::*;
