//! Puma EU men's shoes.
//!
//! Listing tiles embed an analytics JSON blob with most product fields; the
//! detail page adds the description, the available sizes and the brand.

use reqwest::Url;
use scraper::{ElementRef, Html};
use serde::Deserialize;
use serde_json::Value;

use crate::collector::{
    CollectorError, ListingEntry, ListingPage, SiteCollector, collapsed_text, parse_json_attr,
};
use crate::domain::product::Product;
use crate::models::product::{JsonList, JsonProduct, JsonScalar};

const START_URL: &str = "https://eu.puma.com/de/en/men/shoes";
const BRAND: &str = "PUMA";

mod selectors {
    use std::sync::LazyLock;

    use scraper::Selector;

    fn parse(selector: &str) -> Selector {
        Selector::parse(selector).expect("static selector is valid")
    }

    pub static TILE: LazyLock<Selector> = LazyLock::new(|| parse("div.grid-tile"));
    pub static ANALYTICS_ATTR: &str = "data-puma-analytics";
    pub static TILE_LINK: LazyLock<Selector> =
        LazyLock::new(|| parse("a.product-tile-image-link"));
    pub static LOAD_MORE: LazyLock<Selector> =
        LazyLock::new(|| parse("p.loading-bar[data-js-load-more]"));

    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| parse(r#"div[itemprop="description"] p"#));
    pub static SIZE_OPTIONS: LazyLock<Selector> =
        LazyLock::new(|| parse("div.attributes-container [data-component-options]"));
    pub static JSON_LD: LazyLock<Selector> =
        LazyLock::new(|| parse(r#"script[type="application/ld+json"]"#));
}

#[derive(Debug, Default, Deserialize)]
struct TileAnalytics {
    #[serde(default)]
    products: Vec<TileProduct>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TileProduct {
    #[serde(rename = "productID")]
    product_id: JsonScalar,
    local_name: JsonScalar,
    price: JsonScalar,
    list_price: JsonScalar,
    #[serde(rename = "imageURL")]
    image_url: JsonList,
    in_stock: JsonScalar,
    color_name: JsonScalar,
    product_category: JsonScalar,
    category: JsonScalar,
}

impl TileProduct {
    fn into_record(self, url: &Url) -> JsonProduct {
        JsonProduct {
            product_id: self.product_id,
            title: self.local_name,
            brand: JsonScalar::Text(BRAND.to_string()),
            description: JsonScalar::Null,
            current_price: self.price,
            original_price: self.list_price,
            availability: self.in_stock,
            image_urls: self.image_url,
            colors: JsonList::Joined(self.color_name),
            sizes: JsonList::default(),
            category_path: JsonList::Items(vec![self.product_category, self.category]),
            url: JsonScalar::Text(url.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SizeOptions {
    #[serde(default)]
    swatches: Vec<Swatch>,
}

#[derive(Debug, Deserialize)]
struct Swatch {
    label: Option<JsonScalar>,
    #[serde(default)]
    available: Option<Value>,
}

impl Swatch {
    /// A swatch without an `available` flag counts as available.
    fn is_available(&self) -> bool {
        match &self.available {
            None | Some(Value::Null) => true,
            Some(Value::Bool(available)) => *available,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !matches!(s.trim(), "" | "0" | "false"),
            Some(_) => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PumaCollector;

impl PumaCollector {
    fn parse_tile(tile: ElementRef<'_>, page_url: &Url) -> Option<ListingEntry> {
        let raw = tile.value().attr(selectors::ANALYTICS_ATTR)?;
        let analytics: TileAnalytics = parse_json_attr(raw, "Puma tile analytics")?;
        let tile_product = analytics.products.into_iter().next()?;

        let href = tile
            .select(&selectors::TILE_LINK)
            .next()
            .and_then(|link| link.value().attr("href"))?;
        let detail_url = page_url.join(href.trim()).ok()?;

        match Product::try_from(tile_product.into_record(&detail_url)) {
            Ok(product) => Some(ListingEntry {
                product,
                detail_url,
            }),
            Err(e) => {
                log::warn!("Skipping Puma tile {detail_url}: {e}");
                None
            }
        }
    }

    fn sizes(document: &Html) -> Vec<String> {
        document
            .select(&selectors::SIZE_OPTIONS)
            .filter_map(|element| element.value().attr("data-component-options"))
            .filter_map(|raw| serde_json::from_str::<SizeOptions>(raw).ok())
            .flat_map(|options| options.swatches)
            .filter(Swatch::is_available)
            .filter_map(|swatch| swatch.label.map(JsonScalar::into_text))
            .filter(|label| !label.is_empty())
            .collect()
    }

    /// `brand` of the first JSON-LD block, either a name or an object with one.
    fn brand(document: &Html) -> Option<String> {
        let script = document.select(&selectors::JSON_LD).next()?;
        let raw: String = script.text().collect();
        let data: Value = parse_json_attr(&raw, "Puma JSON-LD")?;
        let brand = match data.get("brand")? {
            Value::String(name) => name.trim().to_string(),
            Value::Object(brand) => brand.get("name")?.as_str()?.trim().to_string(),
            _ => return None,
        };
        (!brand.is_empty()).then_some(brand)
    }
}

impl SiteCollector for PumaCollector {
    fn name(&self) -> &'static str {
        "puma"
    }

    fn start_url(&self) -> Result<Url, CollectorError> {
        Url::parse(START_URL).map_err(|e| CollectorError::Url(format!("{START_URL}: {e}")))
    }

    fn parse_listing(&self, html: &str, page_url: &Url) -> ListingPage {
        let document = Html::parse_document(html);
        let entries = document
            .select(&selectors::TILE)
            .filter_map(|tile| Self::parse_tile(tile, page_url))
            .collect();
        let next_page = document
            .select(&selectors::LOAD_MORE)
            .next()
            .and_then(|element| element.value().attr("data-url"))
            .and_then(|href| page_url.join(href.trim()).ok());

        ListingPage { entries, next_page }
    }

    fn parse_detail(&self, html: &str, entry: ListingEntry) -> Product {
        let document = Html::parse_document(html);
        let mut product = entry.product;

        if let Some(paragraph) = document.select(&selectors::DESCRIPTION).next() {
            product.description = collapsed_text(paragraph.text());
        }
        let sizes = Self::sizes(&document);
        if !sizes.is_empty() {
            product.sizes = sizes;
        }
        if let Some(brand) = Self::brand(&document) {
            product.brand = brand;
        }
        product
    }
}
