//! Headline scraper.
//!
//! Fetches the configured news page, pulls one [`NewArticle`] out of every
//! heading that matches the heading selector, and inserts each into the
//! store. Insert failures are logged per headline and never abort the run.
//!
//! The HTTP route uses [`Scraper::spawn`], which returns before any article
//! is written. Callers that list articles right after triggering a scrape
//! may see none, some, or all of the new rows.

use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::config::ScrapeConfig;
use crate::db::Database;
use crate::error::ScrapeError;
use crate::models::NewArticle;

/// Outcome counts of one scrape run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    /// Headings matched on the page.
    pub found: usize,
    pub inserted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct Scraper {
    client: Client,
    source_url: String,
    heading_selector: String,
}

impl Scraper {
    /// Build a scraper, validating the heading selector up front.
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        parse_selector(&config.heading_selector)?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self {
            client,
            source_url: config.source_url.clone(),
            heading_selector: config.heading_selector.clone(),
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Download the source page body. Non-2xx responses are errors.
    #[instrument(level = "debug", skip_all, fields(url = %self.source_url))]
    pub async fn fetch(&self) -> Result<String, ScrapeError> {
        let fetch_error = |source: reqwest::Error| ScrapeError::Fetch {
            url: self.source_url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.source_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;

        response.text().await.map_err(fetch_error)
    }

    /// Fetch, parse and insert, waiting for every insert to finish.
    #[instrument(level = "info", skip_all, fields(url = %self.source_url))]
    pub async fn run(&self, db: &Database) -> Result<ScrapeReport, ScrapeError> {
        let html = self.fetch().await?;
        let headlines = parse_headlines(&html, &self.heading_selector)?;

        let mut report = ScrapeReport {
            found: headlines.len(),
            ..ScrapeReport::default()
        };

        for headline in headlines {
            match db.insert_article(headline) {
                Ok(article) => {
                    debug!(id = %article.id, title = %article.title, "Inserted article");
                    report.inserted += 1;
                }
                Err(e) => {
                    error!(error = %e, "Failed to insert scraped article");
                    report.failed += 1;
                }
            }
        }

        info!(
            found = report.found,
            inserted = report.inserted,
            failed = report.failed,
            "Scrape finished"
        );
        Ok(report)
    }

    /// Start [`run`](Self::run) in the background and return at once.
    ///
    /// Fetch and selector errors are logged inside the task; the handle
    /// resolves to `None` in that case.
    pub fn spawn(&self, db: Database) -> JoinHandle<Option<ScrapeReport>> {
        let scraper = self.clone();
        tokio::spawn(async move {
            match scraper.run(&db).await {
                Ok(report) => Some(report),
                Err(e) => {
                    error!(error = %e, "Scrape failed");
                    None
                }
            }
        })
    }
}

/// Extract one headline per heading matching `selector`.
///
/// The title is the heading's trimmed text. The link is the `href` of the
/// heading's first direct `<a>` child; anchors nested deeper are ignored.
pub fn parse_headlines(html: &str, selector: &str) -> Result<Vec<NewArticle>, ScrapeError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    let headlines = document
        .select(&selector)
        .map(|heading| NewArticle {
            title: heading.text().collect::<String>().trim().to_string(),
            link: first_anchor_href(heading),
        })
        .collect();

    Ok(headlines)
}

fn first_anchor_href(heading: ElementRef<'_>) -> Option<String> {
    heading
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "a")
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headline(title: &str, link: Option<&str>) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            link: link.map(str::to_string),
        }
    }

    #[test]
    fn extracts_title_and_link_from_each_heading() {
        let html = r#"<h2><a href="/x">Headline 1</a></h2><h2>Headline 2</h2>"#;
        let headlines = parse_headlines(html, "h2").unwrap();
        assert_eq!(
            headlines,
            vec![headline("Headline 1", Some("/x")), headline("Headline 2", None)]
        );
    }

    #[test]
    fn trims_whitespace_around_titles() {
        let html = "<h2>\n    <a href=\"/story\">  Colic research update </a>\n</h2>";
        let headlines = parse_headlines(html, "h2").unwrap();
        assert_eq!(headlines, vec![headline("Colic research update", Some("/story"))]);
    }

    #[test]
    fn only_direct_anchor_children_provide_the_link() {
        let html = r#"<h2><span><a href="/nested">Nested</a></span></h2>"#;
        let headlines = parse_headlines(html, "h2").unwrap();
        assert_eq!(headlines, vec![headline("Nested", None)]);
    }

    #[test]
    fn uses_the_first_anchor_when_there_are_several() {
        let html = r#"<h2><a href="/one">One</a> <a href="/two">Two</a></h2>"#;
        let headlines = parse_headlines(html, "h2").unwrap();
        assert_eq!(headlines[0].link.as_deref(), Some("/one"));
        assert_eq!(headlines[0].title, "One Two");
    }

    #[test]
    fn ignores_other_heading_levels() {
        let html = "<h1>Site</h1><h2>Story</h2><h3>Section</h3>";
        let headlines = parse_headlines(html, "h2").unwrap();
        assert_eq!(headlines, vec![headline("Story", None)]);
    }

    #[test]
    fn duplicate_headings_are_kept() {
        let html = "<h2>Same</h2><h2>Same</h2>";
        assert_eq!(parse_headlines(html, "h2").unwrap().len(), 2);
    }

    #[test]
    fn rejects_an_invalid_selector() {
        let err = parse_headlines("<h2>x</h2>", "h2[").unwrap_err();
        assert!(matches!(err, ScrapeError::Selector { .. }));
    }

    #[test]
    fn new_rejects_an_invalid_selector() {
        let config = ScrapeConfig {
            heading_selector: ">>".to_string(),
            ..ScrapeConfig::default()
        };
        assert!(Scraper::new(&config).is_err());
    }
}
