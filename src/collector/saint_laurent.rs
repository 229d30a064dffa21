//! Saint Laurent men's sneakers (Spanish storefront).
//!
//! Listing articles carry a GTM product JSON blob. Further pages come from the
//! storefront's grid endpoint in steps of twelve products for as long as a page
//! returns any.

use std::collections::HashSet;

use reqwest::Url;
use scraper::{ElementRef, Html};
use serde::Deserialize;

use crate::collector::{
    CollectorError, ListingEntry, ListingPage, SiteCollector, collapsed_text, parse_json_attr,
};
use crate::domain::product::Product;
use crate::models::product::{JsonList, JsonProduct, JsonScalar};

const START_URL: &str =
    "https://www.ysl.com/es-es/comprar-art%C3%ADculos-de-hombre/zapatos/sneakers";
const GRID_URL: &str =
    "https://www.ysl.com/on/demandware.store/Sites-SLP-WEUR-Site/es_ES/Search-UpdateGrid";
const GRID_CATEGORY: &str = "sneakers-men";
const PAGE_SIZE: usize = 12;
const RESET_OPTION: &str = "RESET";

mod selectors {
    use std::sync::LazyLock;

    use scraper::Selector;

    fn parse(selector: &str) -> Selector {
        Selector::parse(selector).expect("static selector is valid")
    }

    pub static PRODUCT: LazyLock<Selector> = LazyLock::new(|| parse("article.c-product"));
    pub static GTM_ATTR: &str = "data-gtmproduct";
    pub static PRODUCT_LINK: LazyLock<Selector> = LazyLock::new(|| parse("a.c-product__link"));

    pub static CAROUSEL_IMAGE: LazyLock<Selector> = LazyLock::new(|| {
        parse("div.c-productcarousel li.c-productcarousel__slide img")
    });
    pub static DESCRIPTION: LazyLock<Selector> =
        LazyLock::new(|| parse("p.c-product__longdesc, ul.c-product__detailslist li"));
    pub static SIZE_OPTION: LazyLock<Selector> = LazyLock::new(|| {
        parse(r#"div[data-ref="listbox"] div[role="option"][data-attr-value]"#)
    });
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GtmProduct {
    id: JsonScalar,
    name: JsonScalar,
    brand: JsonScalar,
    discount_price: JsonScalar,
    price: JsonScalar,
    stock: JsonScalar,
    color: JsonScalar,
    top_category: JsonScalar,
    category: JsonScalar,
    sub_category: JsonScalar,
}

impl GtmProduct {
    fn into_record(self, url: &Url) -> JsonProduct {
        JsonProduct {
            product_id: self.id,
            title: self.name,
            brand: self.brand,
            description: JsonScalar::Null,
            current_price: self.discount_price,
            original_price: self.price,
            availability: self.stock,
            image_urls: JsonList::default(),
            colors: JsonList::Joined(self.color),
            sizes: JsonList::default(),
            category_path: JsonList::Items(vec![
                self.top_category,
                self.category,
                self.sub_category,
            ]),
            url: JsonScalar::Text(url.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SaintLaurentCollector;

impl SaintLaurentCollector {
    fn parse_article(article: ElementRef<'_>, page_url: &Url) -> Option<ListingEntry> {
        let gtm: GtmProduct = match article.value().attr(selectors::GTM_ATTR) {
            Some(raw) => parse_json_attr(raw, "Saint Laurent GTM product")?,
            None => GtmProduct::default(),
        };
        let href = article
            .select(&selectors::PRODUCT_LINK)
            .next()
            .and_then(|link| link.value().attr("href"))?;
        let detail_url = page_url.join(href.trim()).ok()?;

        match Product::try_from(gtm.into_record(&detail_url)) {
            Ok(product) => Some(ListingEntry {
                product,
                detail_url,
            }),
            Err(e) => {
                log::warn!("Skipping Saint Laurent product {detail_url}: {e}");
                None
            }
        }
    }

    /// Grid endpoint for the page after the one at `page_url`.
    fn next_grid_page(page_url: &Url) -> Option<Url> {
        let start = page_url
            .query_pairs()
            .find(|(key, _)| key == "start")
            .and_then(|(_, value)| value.parse::<usize>().ok())
            .unwrap_or(0);
        let mut next = Url::parse(GRID_URL).ok()?;
        next.query_pairs_mut()
            .append_pair("cgid", GRID_CATEGORY)
            .append_pair("start", &(start + PAGE_SIZE).to_string())
            .append_pair("sz", &PAGE_SIZE.to_string());
        Some(next)
    }

    /// Carousel image urls from `src` and `data-src`, first occurrence kept.
    fn image_urls(document: &Html) -> Vec<String> {
        let mut seen = HashSet::new();
        document
            .select(&selectors::CAROUSEL_IMAGE)
            .flat_map(|img| [img.value().attr("src"), img.value().attr("data-src")])
            .flatten()
            .map(str::trim)
            .filter(|url| !url.is_empty() && !url.contains("placeholder"))
            .filter(|url| seen.insert(url.to_string()))
            .map(str::to_string)
            .collect()
    }

    fn sizes(document: &Html) -> Vec<String> {
        document
            .select(&selectors::SIZE_OPTION)
            .filter_map(|option| option.value().attr("data-attr-value"))
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != RESET_OPTION)
            .map(str::to_string)
            .collect()
    }
}

impl SiteCollector for SaintLaurentCollector {
    fn name(&self) -> &'static str {
        "saint_laurent"
    }

    fn start_url(&self) -> Result<Url, CollectorError> {
        Url::parse(START_URL).map_err(|e| CollectorError::Url(format!("{START_URL}: {e}")))
    }

    fn parse_listing(&self, html: &str, page_url: &Url) -> ListingPage {
        let document = Html::parse_document(html);
        let articles: Vec<ElementRef<'_>> = document.select(&selectors::PRODUCT).collect();
        let next_page = if articles.is_empty() {
            None
        } else {
            Self::next_grid_page(page_url)
        };
        let entries = articles
            .into_iter()
            .filter_map(|article| Self::parse_article(article, page_url))
            .collect();

        ListingPage { entries, next_page }
    }

    fn parse_detail(&self, html: &str, entry: ListingEntry) -> Product {
        let document = Html::parse_document(html);
        let mut product = entry.product;

        let image_urls = Self::image_urls(&document);
        if !image_urls.is_empty() {
            product.image_urls = image_urls;
        }
        let description = collapsed_text(
            document
                .select(&selectors::DESCRIPTION)
                .flat_map(|element| element.text()),
        );
        if !description.is_empty() {
            product.description = description;
        }
        let sizes = Self::sizes(&document);
        if !sizes.is_empty() {
            product.sizes = sizes;
        }
        product
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <article class="c-product" data-gtmproduct='{"id":"610662AAAAA1000","name":"Court Classic SL/06","brand":"Saint Laurent","discountPrice":"595.00","price":null,"stock":"in stock","color":"Blanco","topCategory":"Hombre","category":"Zapatos","subCategory":"Sneakers"}'>
            <a class="c-product__link" href="/es-es/sneakers/court-classic-610662AAAAA1000.html"></a>
          </article>
          <article class="c-product" data-gtmproduct='{"id":"","name":"No id"}'>
            <a class="c-product__link" href="/es-es/sneakers/no-id.html"></a>
          </article>
        </body></html>
    "#;

    const DETAIL: &str = r#"
        <html><body>
          <div class="c-productcarousel"><ul>
            <li class="c-productcarousel__slide"><img src="https://saint-laurent.dam/1.jpg" data-src="https://saint-laurent.dam/1.jpg"></li>
            <li class="c-productcarousel__slide"><img src="https://saint-laurent.dam/placeholder.svg" data-src="https://saint-laurent.dam/2.jpg"></li>
          </ul></div>
          <p class="c-product__longdesc">Sneakers   de piel
            perforada.</p>
          <ul class="c-product__detailslist"><li>Suela de goma</li><li> Hecho en Italia </li></ul>
          <div data-ref="listbox">
            <div role="option" data-attr-value="RESET">Talla</div>
            <div role="option" data-attr-value="40">40</div>
            <div role="option" data-attr-value="41.5">41.5</div>
          </div>
        </body></html>
    "#;

    #[test]
    fn listing_extracts_products_and_next_grid_page() {
        let page_url = SaintLaurentCollector.start_url().unwrap();
        let page = SaintLaurentCollector.parse_listing(LISTING, &page_url);

        assert_eq!(page.entries.len(), 1);
        let product = &page.entries[0].product;
        assert_eq!(product.product_id, "610662AAAAA1000");
        assert_eq!(product.brand, "Saint Laurent");
        assert_eq!(product.current_price.unwrap(), 595.0);
        assert_eq!(product.original_price, None);
        assert_eq!(product.availability, "in stock");
        assert_eq!(product.colors, vec!["Blanco"]);
        assert_eq!(product.category_path, vec!["Hombre", "Zapatos", "Sneakers"]);
        assert_eq!(
            product.url,
            "https://www.ysl.com/es-es/sneakers/court-classic-610662AAAAA1000.html"
        );

        let next = page.next_page.unwrap();
        assert_eq!(next.as_str(), format!("{GRID_URL}?cgid=sneakers-men&start=12&sz=12"));

        let after = SaintLaurentCollector.parse_listing(LISTING, &next);
        assert_eq!(
            after.next_page.unwrap().as_str(),
            format!("{GRID_URL}?cgid=sneakers-men&start=24&sz=12")
        );
    }

    #[test]
    fn empty_grid_page_ends_the_listing() {
        let page_url = SaintLaurentCollector.start_url().unwrap();
        let page = SaintLaurentCollector.parse_listing("<html><body></body></html>", &page_url);
        assert!(page.entries.is_empty());
        assert!(page.next_page.is_none());
    }

    #[test]
    fn detail_adds_images_description_and_sizes() {
        let page_url = SaintLaurentCollector.start_url().unwrap();
        let mut page = SaintLaurentCollector.parse_listing(LISTING, &page_url);
        let entry = page.entries.remove(0);

        let product = SaintLaurentCollector.parse_detail(DETAIL, entry);

        assert_eq!(
            product.image_urls,
            vec!["https://saint-laurent.dam/1.jpg", "https://saint-laurent.dam/2.jpg"]
        );
        assert_eq!(
            product.description,
            "Sneakers de piel perforada. Suela de goma Hecho en Italia"
        );
        assert_eq!(product.sizes, vec!["40", "41.5"]);
    }
}
