use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::services::ServiceError;
use crate::services::export::DownloadFile;

pub mod products;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// JSON error body `{ "error": message }` with the given status.
pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: message })
}

/// Maps a service failure to its HTTP status.
pub fn service_error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Validation(message) => error_response(StatusCode::BAD_REQUEST, &message),
        ServiceError::NotFound(message) => error_response(StatusCode::NOT_FOUND, &message),
        ServiceError::DuplicateId(message) => error_response(StatusCode::CONFLICT, &message),
        ServiceError::Internal => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Sends `file` as an attachment.
pub fn download_response(file: DownloadFile) -> HttpResponse {
    HttpResponse::Ok()
        .append_header(("Content-Type", file.content_type))
        .append_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file.file_name),
        ))
        .body(file.bytes)
}

/// Rejects undecodable JSON bodies with a JSON 400 instead of actix's plain text.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = error_response(StatusCode::BAD_REQUEST, &err.to_string());
        InternalError::from_response(err, response).into()
    })
}

/// Rejects malformed query strings, including unknown keys, with a JSON 400.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = error_response(StatusCode::BAD_REQUEST, &err.to_string());
        InternalError::from_response(err, response).into()
    })
}

/// Registers every route of the catalog API.
///
/// Fixed paths under `/products/` are registered before `/products/{product_id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(products::list_products)
        .service(products::search_products)
        .service(products::show_summary)
        .service(products::show_summary_details)
        .service(products::show_visualization)
        .service(products::export_products)
        .service(products::create_product)
        .service(products::update_product)
        .service(products::delete_product);
}
