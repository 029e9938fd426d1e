use axum::http::StatusCode;
use axum_test::TestServer;
use newsroom::api::{create_router, create_router_with_assets, ErrorBody};
use newsroom::config::ScrapeConfig;
use newsroom::db::Database;
use newsroom::models::*;
use newsroom::scrape::Scraper;
use serde_json::json;
use uuid::Uuid;

fn setup() -> (TestServer, Database) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db.clone(), test_scraper());
    (
        TestServer::new(app).expect("Failed to create test server"),
        db,
    )
}

// Nothing listens here; scrape tests live in scrape_spec.rs.
fn test_scraper() -> Scraper {
    Scraper::new(&ScrapeConfig::with_source_url("http://127.0.0.1:9/news"))
        .expect("Failed to build scraper")
}

fn insert(db: &Database, title: &str, link: Option<&str>) -> Article {
    db.insert_article(NewArticle {
        title: title.to_string(),
        link: link.map(str::to_string),
    })
    .expect("Failed to insert article")
}

mod pages {
    use super::*;

    #[tokio::test]
    async fn home_lists_only_unsaved_articles() {
        let (server, db) = setup();
        insert(&db, "Inbox headline", None);
        let kept = insert(&db, "Kept headline", None);
        db.save_article(&kept.id.to_string()).unwrap();

        let response = server.get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Inbox headline"));
        assert!(!html.contains("Kept headline"));
    }

    #[tokio::test]
    async fn saved_lists_only_saved_articles_with_notes() {
        let (server, db) = setup();
        insert(&db, "Inbox headline", None);
        let kept = insert(&db, "Kept headline", None);
        db.save_article(&kept.id.to_string()).unwrap();
        db.add_note(&kept.id.to_string(), "Read again later".to_string())
            .unwrap();

        let response = server.get("/saved").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Kept headline"));
        assert!(html.contains("Read again later"));
        assert!(!html.contains("Inbox headline"));
    }
}

mod articles {
    use super::*;

    #[tokio::test]
    async fn list_returns_empty_when_nothing_scraped() {
        let (server, _db) = setup();

        let response = server.get("/articles").await;

        response.assert_status_ok();
        let articles: Vec<Article> = response.json();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn list_returns_saved_and_unsaved_articles() {
        let (server, db) = setup();
        insert(&db, "One", Some("/one"));
        let two = insert(&db, "Two", None);
        db.save_article(&two.id.to_string()).unwrap();

        let articles: Vec<Article> = server.get("/articles").await.json();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].link.as_deref(), Some("/one"));
        assert!(articles[1].saved);
    }

    #[tokio::test]
    async fn get_returns_article_with_populated_notes() {
        let (server, db) = setup();
        let article = insert(&db, "Populated", None);
        let note = db
            .add_note(&article.id.to_string(), "inline".to_string())
            .unwrap();

        let response = server.get(&format!("/articles/{}", article.id)).await;

        response.assert_status_ok();
        let found: PopulatedArticle = response.json();
        assert_eq!(found.notes, vec![note]);
    }

    #[tokio::test]
    async fn get_returns_error_payload_for_missing_article() {
        let (server, _db) = setup();

        let response = server.get(&format!("/articles/{}", Uuid::new_v4())).await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "not_found");
    }

    #[tokio::test]
    async fn get_rejects_malformed_id_as_invalid() {
        let (server, _db) = setup();

        let response = server.get("/articles/not-a-uuid").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "invalid_id");
    }

    #[tokio::test]
    async fn save_marks_article_saved() {
        let (server, db) = setup();
        let article = insert(&db, "Save me", None);

        let response = server
            .post(&format!("/articles/save/{}", article.id))
            .await;

        response.assert_status_ok();
        let saved: Article = response.json();
        assert!(saved.saved);
        assert_eq!(saved.id, article.id);
    }

    #[tokio::test]
    async fn save_returns_error_payload_for_missing_article() {
        let (server, _db) = setup();

        let response = server
            .post(&format!("/articles/save/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "not_found");
        assert!(body.message.contains("Article"));
    }

    #[tokio::test]
    async fn delete_unsaves_and_purges_notes() {
        let (server, db) = setup();
        let article = insert(&db, "Drop me", None);
        let id = article.id.to_string();
        db.save_article(&id).unwrap();
        let note = db.add_note(&id, "gone soon".to_string()).unwrap();

        let response = server.post(&format!("/articles/delete/{}", id)).await;

        response.assert_status_ok();
        assert_eq!(response.text(), "Article Deleted");

        let stored: PopulatedArticle = server.get(&format!("/articles/{}", id)).await.json();
        assert!(!stored.saved);
        assert!(stored.notes.is_empty());
        assert!(db.get_note(&note.id.to_string()).unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_error_payload_for_missing_article() {
        let (server, _db) = setup();

        let response = server
            .post(&format!("/articles/delete/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "not_found");
    }
}

mod notes {
    use super::*;

    #[tokio::test]
    async fn save_creates_note_from_json_body() {
        let (server, db) = setup();
        let article = insert(&db, "Annotate me", None);

        let response = server
            .post(&format!("/notes/save/{}", article.id))
            .json(&json!({ "text": "hello" }))
            .await;

        response.assert_status_ok();
        let note: Note = response.json();
        assert_eq!(note.body, "hello");
        assert_eq!(note.article, article.id);

        let found: PopulatedArticle = server
            .get(&format!("/articles/{}", article.id))
            .await
            .json();
        assert_eq!(found.notes.len(), 1);
        assert_eq!(found.notes[0].id, note.id);
        assert_eq!(found.notes[0].body, "hello");
    }

    #[tokio::test]
    async fn save_accepts_form_body() {
        let (server, db) = setup();
        let article = insert(&db, "Form note", None);

        let response = server
            .post(&format!("/notes/save/{}", article.id))
            .form(&NoteInput {
                text: "from a form".to_string(),
            })
            .await;

        response.assert_status_ok();
        let note: Note = response.json();
        assert_eq!(note.body, "from a form");
    }

    #[tokio::test]
    async fn save_rejects_body_without_text() {
        let (server, db) = setup();
        let article = insert(&db, "No text", None);

        let response = server
            .post(&format!("/notes/save/{}", article.id))
            .json(&json!({ "body": "wrong field" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.error, "invalid_body");
    }

    #[tokio::test]
    async fn save_returns_error_payload_for_missing_article() {
        let (server, _db) = setup();

        let response = server
            .post(&format!("/notes/save/{}", Uuid::new_v4()))
            .json(&json!({ "text": "orphan" }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_note_then_reports_not_found() {
        let (server, db) = setup();
        let article = insert(&db, "Round trip", None);
        let note = db
            .add_note(&article.id.to_string(), "short lived".to_string())
            .unwrap();
        let path = format!("/notes/delete/{}/{}", note.id, article.id);

        let response = server.delete(&path).await;
        response.assert_status_ok();
        assert_eq!(response.text(), "Note Deleted");

        let found: PopulatedArticle = server
            .get(&format!("/articles/{}", article.id))
            .await
            .json();
        assert!(found.notes.is_empty());

        let again = server.delete(&path).await;
        again.assert_status(StatusCode::NOT_FOUND);
        let body: ErrorBody = again.json();
        assert_eq!(body.error, "not_found");
    }
}

mod static_assets {
    use super::*;

    #[tokio::test]
    async fn serves_files_from_public_dir_for_unrouted_paths() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("style.css"), "body { color: red; }")
            .expect("Failed to write asset");

        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        insert(&db, "Routed", None);
        let app = create_router_with_assets(db, test_scraper(), dir.path());
        let server = TestServer::new(app).expect("Failed to create test server");

        let css = server.get("/style.css").await;
        css.assert_status_ok();
        assert_eq!(css.text(), "body { color: red; }");

        let articles = server.get("/articles").await;
        articles.assert_status_ok();
        let articles: Vec<Article> = articles.json();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Routed");
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        let server = TestServer::new(create_router_with_assets(db, test_scraper(), dir.path()))
            .expect("Failed to create test server");

        server
            .get("/missing.js")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
