//! Offline collectors that turn a retailer's catalog pages into a flat file.
//!
//! Each site implements [`SiteCollector`], which only parses HTML. The
//! [`Collector`] drives the crawl: it fetches a listing page, completes every
//! entry from its detail page and follows the listing's next page until the
//! page limit is reached.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::domain::product::Product;
use crate::models::product::ProductRecordError;

pub mod puma;
pub mod saint_laurent;
pub mod writer;

const USER_AGENT: &str = concat!("footwear-catalog/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("invalid url {0}")]
    Url(String),
    #[error("invalid product data: {0}")]
    Record(#[from] ProductRecordError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

/// A product seen on a listing page, still missing its detail-page fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub product: Product,
    pub detail_url: Url,
}

/// Entries of one listing page and where the listing continues.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub entries: Vec<ListingEntry>,
    pub next_page: Option<Url>,
}

/// HTML parsing for one retailer.
pub trait SiteCollector {
    /// Short name used in logs and output file names.
    fn name(&self) -> &'static str;

    /// First listing page of the crawl.
    fn start_url(&self) -> Result<Url, CollectorError>;

    /// Extracts the product entries and the next page from a listing page.
    fn parse_listing(&self, html: &str, page_url: &Url) -> ListingPage;

    /// Completes `entry` with the fields only its detail page carries.
    fn parse_detail(&self, html: &str, entry: ListingEntry) -> Product;
}

/// Source of page bodies for the [`Collector`].
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> Result<String, CollectorError>;
}

/// Fetches pages over HTTP with a blocking client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, CollectorError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(CollectorError::Client)?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String, CollectorError> {
        log::debug!("Fetching {url}");
        let http_error = |source| CollectorError::Http {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url.clone()).send().map_err(http_error)?;
        if !response.status().is_success() {
            return Err(CollectorError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        response.text().map_err(http_error)
    }
}

/// Runs a [`SiteCollector`] sequentially.
pub struct Collector<F> {
    fetcher: F,
    max_pages: usize,
}

impl<F: PageFetcher> Collector<F> {
    /// `max_pages` bounds the number of listing pages fetched; at least one is.
    pub fn new(fetcher: F, max_pages: usize) -> Self {
        Self {
            fetcher,
            max_pages: max_pages.max(1),
        }
    }

    /// Crawls `site` and returns its products in listing order.
    ///
    /// A failure on the first listing page is an error. A later listing page
    /// that fails ends the crawl with the products gathered so far. A failed
    /// detail page keeps the listing data for that product.
    pub fn run<S>(&self, site: &S) -> Result<Vec<Product>, CollectorError>
    where
        S: SiteCollector + ?Sized,
    {
        let mut products = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(site.start_url()?);
        let mut pages = 0;

        while let Some(page_url) = next.take() {
            if pages == self.max_pages {
                log::info!("{}: reached the limit of {} pages", site.name(), self.max_pages);
                break;
            }
            let html = match self.fetcher.fetch(&page_url) {
                Ok(html) => html,
                Err(e) if pages == 0 => return Err(e),
                Err(e) => {
                    log::error!("{}: stopping at listing page {page_url}: {e}", site.name());
                    break;
                }
            };
            pages += 1;

            let listing = site.parse_listing(&html, &page_url);
            log::info!(
                "{}: listing page {pages} has {} products",
                site.name(),
                listing.entries.len()
            );

            for entry in listing.entries {
                if !seen.insert(entry.product.product_id.as_str().to_lowercase()) {
                    log::warn!(
                        "{}: skipping repeated product {}",
                        site.name(),
                        entry.product.product_id
                    );
                    continue;
                }
                let product = match self.fetcher.fetch(&entry.detail_url) {
                    Ok(html) => site.parse_detail(&html, entry),
                    Err(e) => {
                        log::warn!(
                            "{}: keeping listing data for {}: {e}",
                            site.name(),
                            entry.product.product_id
                        );
                        entry.product
                    }
                };
                products.push(product);
            }

            next = listing.next_page;
        }

        log::info!("{}: collected {} products", site.name(), products.len());
        Ok(products)
    }
}

/// Parses `raw` as JSON, logging and discarding malformed values.
pub(crate) fn parse_json_attr<T>(raw: &str, what: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring malformed {what}: {e}");
            None
        }
    }
}

/// Text content of an element with runs of whitespace collapsed.
pub(crate) fn collapsed_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
