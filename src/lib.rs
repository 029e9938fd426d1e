//! Newsroom: scrape news headlines into a local store, then browse, save,
//! annotate and drop them through HTML pages and a small JSON API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod scrape;
pub mod views;
