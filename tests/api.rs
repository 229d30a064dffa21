#![cfg(feature = "server")]

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use footwear_catalog::loader::load_table;
use footwear_catalog::models::config::ServerConfig;
use footwear_catalog::repository::InMemoryRepository;
use footwear_catalog::routes::configure;
use footwear_catalog::services::visualization::chart_templates;

mod common;

use common::{TWO_PRODUCTS_JSON, TestDataFile};

fn test_state() -> (
    web::Data<InMemoryRepository>,
    web::Data<ServerConfig>,
    web::Data<tera::Tera>,
) {
    let file = TestDataFile::new("json", TWO_PRODUCTS_JSON);
    let (table, _report) = load_table(file.path()).expect("test data should load");
    let config = ServerConfig {
        address: "127.0.0.1".into(),
        port: 0,
        data_file: "data/products.json".into(),
        visualization_dir: None,
    };
    (
        web::Data::new(InMemoryRepository::new(table)),
        web::Data::new(config),
        web::Data::new(chart_templates().expect("chart templates should build")),
    )
}

macro_rules! init_app {
    () => {{
        let (repo, config, tera) = test_state();
        test::init_service(
            App::new()
                .app_data(repo)
                .app_data(config)
                .app_data(tera)
                .configure(configure),
        )
        .await
    }};
}

fn ids(body: &Value) -> Vec<&str> {
    body["products"]
        .as_array()
        .expect("products should be an array")
        .iter()
        .map(|p| p["product_id"].as_str().expect("product_id should be a string"))
        .collect()
}

#[actix_web::test]
async fn list_returns_all_products_in_table_order() {
    let app = init_app!();
    let req = test::TestRequest::get().uri("/products").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_products"], 2);
    assert_eq!(ids(&body), vec!["1", "2"]);
}

#[actix_web::test]
async fn search_by_color_sorted_by_price() {
    let app = init_app!();
    let req = test::TestRequest::get()
        .uri("/products/search?colors=red&sort_by=current_price&sort_order=asc")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total_products"], 1);
    assert_eq!(ids(&body), vec!["1"]);
}

#[actix_web::test]
async fn search_orders_by_price_descending() {
    let app = init_app!();
    let req = test::TestRequest::get()
        .uri("/products/search?sort_by=current_price&sort_order=desc")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(ids(&body), vec!["1", "2"]);
}

#[actix_web::test]
async fn search_without_matches_is_ok_and_empty() {
    let app = init_app!();
    let req = test::TestRequest::get()
        .uri("/products/search?title=zzz")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total_products"], 0);
    assert!(ids(&body).is_empty());
}

#[actix_web::test]
async fn search_rejects_bad_parameters() {
    let app = init_app!();
    for uri in [
        "/products/search?colour=red",
        "/products/search?min_price=abc",
        "/products/search?min_price=90&max_price=10",
        "/products/search?sort_by=title&sort_order=up",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[actix_web::test]
async fn unknown_sort_field_keeps_table_order() {
    let app = init_app!();
    let req = test::TestRequest::get()
        .uri("/products/search?sort_by=popularity")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&body), vec!["1", "2"]);
}

#[actix_web::test]
async fn summary_counts_products_per_category() {
    let app = init_app!();
    let req = test::TestRequest::get()
        .uri("/products/summary")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "Shoes > Running": 1, "Shoes > Sneakers": 1 }));
}

#[actix_web::test]
async fn summary_details_include_average_price() {
    let app = init_app!();
    let req = test::TestRequest::get()
        .uri("/products/summary/details")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let details = body.as_array().expect("details should be an array");
    assert_eq!(details.len(), 2);
    assert_eq!(details[0]["category_path"], "Shoes > Running");
    assert_eq!(details[0]["average_price"], 80.0);
    assert_eq!(details[0]["availability"]["In stock"], 1);
}

#[actix_web::test]
async fn create_then_search_finds_the_new_product() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/products/create")
        .set_json(json!({
            "product_id": "3",
            "title": "Court Classic",
            "current_price": 120.0,
            "colors": ["White"],
            "sizes": "41, 42",
            "category_path": ["Shoes", "Sneakers"]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["product_id"], "3");
    assert_eq!(created["sizes"], json!(["41", "42"]));

    let req = test::TestRequest::get()
        .uri("/products/search?product_id=3")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&body), vec!["3"]);
}

#[actix_web::test]
async fn search_by_id_is_an_exact_match() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/products/create")
        .set_json(json!({ "product_id": "10", "title": "Future Rider" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/products/search?product_id=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&body), vec!["1"]);
}

#[actix_web::test]
async fn create_assigns_next_id_when_missing() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/products/create")
        .set_json(json!({ "title": "Suede Classic" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["product_id"], "3");
}

#[actix_web::test]
async fn create_rejects_duplicates_and_invalid_bodies() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/products/create")
        .set_json(json!({ "product_id": " 1 ", "title": "Copy" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    for body in [
        json!({ "title": "" }),
        json!({ "title": "Shoe", "current_price": -5 }),
        json!({ "title": "Shoe", "url": "nope" }),
        json!({ "title": "Shoe", "rating": 5 }),
        json!({ "brand": "PUMA" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/products/create")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    let req = test::TestRequest::post()
        .uri("/products/create")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn update_changes_only_supplied_fields() {
    let app = init_app!();
    let req = test::TestRequest::put()
        .uri("/products/1")
        .set_json(json!({ "current_price": 75.5, "colors": ["red", "black"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;

    assert_eq!(updated["current_price"], 75.5);
    assert_eq!(updated["colors"], json!(["red", "black"]));
    assert_eq!(updated["title"], "Air Runner");
    assert_eq!(updated["original_price"], 100.0);

    let req = test::TestRequest::get()
        .uri("/products/search?colors=black")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&body), vec!["1"]);
}

#[actix_web::test]
async fn update_missing_product_is_not_found() {
    let app = init_app!();
    let req = test::TestRequest::put()
        .uri("/products/99")
        .set_json(json!({ "title": "Ghost" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap_or_default().contains("99"));
}

#[actix_web::test]
async fn update_rejects_id_changes_and_empty_bodies() {
    let app = init_app!();
    for body in [json!({ "product_id": "5" }), json!({})] {
        let req = test::TestRequest::put()
            .uri("/products/1")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[actix_web::test]
async fn delete_then_search_finds_nothing() {
    let app = init_app!();
    let req = test::TestRequest::delete().uri("/products/2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let removed: Value = test::read_body_json(resp).await;
    assert_eq!(removed["product_id"], "2");

    let req = test::TestRequest::get()
        .uri("/products/search?product_id=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(ids(&body).is_empty());

    let req = test::TestRequest::delete().uri("/products/2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn visualization_is_an_svg_attachment() {
    let app = init_app!();
    let req = test::TestRequest::get()
        .uri("/products/visualization")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers();
    assert_eq!(
        headers.get("Content-Type").and_then(|v| v.to_str().ok()),
        Some("image/svg+xml")
    );
    let disposition = headers
        .get("Content-Disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("products_per_category_products_"));
    assert!(disposition.ends_with(".svg\""));

    let body = test::read_body(resp).await;
    let svg = String::from_utf8(body.to_vec()).expect("svg should be utf-8");
    assert!(svg.contains("Product Count by Category"));
}

#[actix_web::test]
async fn export_renders_requested_format() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/products/export?format=csv")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let csv = String::from_utf8(body.to_vec()).expect("csv should be utf-8");
    assert!(csv.starts_with("product_id,title,brand"));
    assert!(csv.contains("Shoes > Running"));

    let req = test::TestRequest::get()
        .uri("/products/export?format=json")
        .to_request();
    let exported: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(exported.as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::get()
        .uri("/products/export?format=pdf")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
