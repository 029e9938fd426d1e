//! Server-rendered HTML pages.
//!
//! Both pages share [`layout`]. Buttons carry `data-*` attributes that
//! `public/app.js` turns into calls against the JSON routes.

use crate::models::{Article, Note, PopulatedArticle};

/// Home page: unsaved articles with a scrape trigger and save buttons.
pub fn render_home(articles: &[Article]) -> String {
    let mut body = String::new();
    body.push_str(
        r#"<section class="actions"><button class="scrape" data-scrape>Scrape New Articles</button></section>"#,
    );

    if articles.is_empty() {
        body.push_str(r#"<p class="empty">No new articles. Scrape to fetch the latest headlines.</p>"#);
    }

    body.push_str(r#"<ul class="articles">"#);
    for article in articles {
        body.push_str(&format!(
            r#"<li class="article" data-id="{id}">{headline}<button class="save" data-save="{id}">Save Article</button></li>"#,
            id = article.id,
            headline = headline(&article.title, article.link.as_deref()),
        ));
    }
    body.push_str("</ul>");

    layout("Newsroom", &body)
}

/// Saved page: saved articles with their notes, a note form and delete buttons.
pub fn render_saved(articles: &[PopulatedArticle]) -> String {
    let mut body = String::new();

    if articles.is_empty() {
        body.push_str(r#"<p class="empty">No saved articles yet.</p>"#);
    }

    body.push_str(r#"<ul class="articles">"#);
    for article in articles {
        body.push_str(&format!(
            r#"<li class="article" data-id="{id}">{headline}<button class="delete" data-delete="{id}">Delete From Saved</button>"#,
            id = article.id,
            headline = headline(&article.title, article.link.as_deref()),
        ));

        body.push_str(r#"<ul class="notes">"#);
        for note in &article.notes {
            render_note(&mut body, note);
        }
        body.push_str("</ul>");

        body.push_str(&format!(
            r#"<form class="note-form" data-note-form="{id}"><textarea name="text" placeholder="New note"></textarea><button type="submit">Save Note</button></form></li>"#,
            id = article.id,
        ));
    }
    body.push_str("</ul>");

    layout("Newsroom - Saved", &body)
}

fn render_note(out: &mut String, note: &Note) {
    out.push_str(&format!(
        r#"<li class="note">{body}<button class="delete-note" data-note="{note_id}" data-article="{article_id}">x</button></li>"#,
        body = escape(&note.body),
        note_id = note.id,
        article_id = note.article,
    ));
}

fn headline(title: &str, link: Option<&str>) -> String {
    match link {
        Some(href) => format!(
            r#"<h2><a href="{}" target="_blank" rel="noopener">{}</a></h2>"#,
            escape(href),
            escape(title)
        ),
        None => format!("<h2>{}</h2>", escape(title)),
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<nav><a href="/">Home</a> <a href="/saved">Saved Articles</a></nav>
<main>
{body}
</main>
<script src="/app.js"></script>
</body>
</html>
"#,
        title = escape(title),
        body = body,
    )
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
