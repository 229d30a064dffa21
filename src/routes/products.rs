use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use serde::Deserialize;
use tera::Tera;

use crate::domain::product::{NewProduct, ProductPatch};
use crate::forms::products::{CreateProductForm, SearchProductsForm, UpdateProductForm};
use crate::models::config::ServerConfig;
use crate::repository::{InMemoryRepository, ProductListQuery};
use crate::routes::{download_response, error_response, service_error_response};
use crate::services::export::export_products as export_products_service;
use crate::services::products::{
    create_product as create_product_service, delete_product as delete_product_service,
    list_products as list_products_service, search_products as search_products_service,
    update_product as update_product_service,
};
use crate::services::summary::{
    show_summary as show_summary_service, show_summary_details as show_summary_details_service,
};
use crate::services::visualization::show_visualization as show_visualization_service;

fn default_format() -> String {
    "csv".to_string()
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExportQueryParams {
    #[serde(default = "default_format")]
    format: String,
}

#[get("/products")]
pub async fn list_products(repo: web::Data<InMemoryRepository>) -> impl Responder {
    match list_products_service(repo.get_ref()) {
        Ok(listing) => HttpResponse::Ok().json(listing),
        Err(err) => service_error_response(err),
    }
}

#[get("/products/search")]
pub async fn search_products(
    params: web::Query<SearchProductsForm>,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    let query: ProductListQuery = match params.into_inner().try_into() {
        Ok(query) => query,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match search_products_service(&query, repo.get_ref()) {
        Ok(listing) => HttpResponse::Ok().json(listing),
        Err(err) => service_error_response(err),
    }
}

#[get("/products/summary")]
pub async fn show_summary(repo: web::Data<InMemoryRepository>) -> impl Responder {
    match show_summary_service(repo.get_ref()) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => service_error_response(err),
    }
}

#[get("/products/summary/details")]
pub async fn show_summary_details(repo: web::Data<InMemoryRepository>) -> impl Responder {
    match show_summary_details_service(repo.get_ref()) {
        Ok(details) => HttpResponse::Ok().json(details),
        Err(err) => service_error_response(err),
    }
}

#[get("/products/visualization")]
pub async fn show_visualization(
    repo: web::Data<InMemoryRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_visualization_service(
        &server_config.data_file,
        server_config.visualization_dir.as_deref(),
        &tera,
        repo.get_ref(),
    ) {
        Ok(file) => download_response(file),
        Err(err) => service_error_response(err),
    }
}

#[get("/products/export")]
pub async fn export_products(
    params: web::Query<ExportQueryParams>,
    repo: web::Data<InMemoryRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match export_products_service(&params.format, &server_config.data_file, repo.get_ref()) {
        Ok(file) => download_response(file),
        Err(err) => service_error_response(err),
    }
}

#[post("/products/create")]
pub async fn create_product(
    repo: web::Data<InMemoryRepository>,
    web::Json(form): web::Json<CreateProductForm>,
) -> impl Responder {
    let payload: NewProduct = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match create_product_service(payload, repo.get_ref()) {
        Ok(product) => HttpResponse::Created().json(product),
        Err(err) => service_error_response(err),
    }
}

#[put("/products/{product_id}")]
pub async fn update_product(
    product_id: web::Path<String>,
    repo: web::Data<InMemoryRepository>,
    web::Json(form): web::Json<UpdateProductForm>,
) -> impl Responder {
    let patch: ProductPatch = match form.try_into() {
        Ok(patch) => patch,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match update_product_service(&product_id, patch, repo.get_ref()) {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => service_error_response(err),
    }
}

#[delete("/products/{product_id}")]
pub async fn delete_product(
    product_id: web::Path<String>,
    repo: web::Data<InMemoryRepository>,
) -> impl Responder {
    match delete_product_service(&product_id, repo.get_ref()) {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => service_error_response(err),
    }
}
