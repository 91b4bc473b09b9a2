#![doc = "doc-scrape-core: core pipeline for doc-scrape."]

//! This crate holds the whole scrape pipeline and its data model: fetching a
//! documentation page, isolating its primary section, rewriting it for
//! markdown, converting, storing the markdown and tracking a content hash.
//! Cloud backends live in the `doc-scrape` crate; this crate ships the trait
//! seams, an HTTP fetcher and filesystem stores.
//!
//! # Usage
//! Call [`pipeline::scrape_page`] for one URL or [`pipeline::scrape_all`] for a
//! batch, passing any [`contract::PageFetcher`], [`contract::ObjectStore`] and
//! [`contract::HashStore`] implementations.

pub mod config;
pub mod contract;
pub mod convert;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod handler;
pub mod hash;
pub mod local;
pub mod normalize;
pub mod pipeline;
pub mod storage;

pub use error::{ScrapeError, Stage};
